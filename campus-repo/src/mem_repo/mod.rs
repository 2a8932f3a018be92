use crate::course_repo::CourseRepo;
use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;
use crate::HealthCheck;
use std::sync::Arc;

mod course_repo;
mod payment_repo;

pub fn create_course_repos() -> (Arc<dyn CourseRepo>, Arc<dyn HealthCheck>) {
    let repo = Arc::new(course_repo::MemCourseRepo::new());
    let course_repo: Arc<dyn CourseRepo> = repo.clone();
    let health_check: Arc<dyn HealthCheck> = repo;
    (course_repo, health_check)
}

/// Users and transactions share one store so settlement can update both under a single lock.
pub fn create_payment_repos() -> (
    Arc<dyn UserRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn HealthCheck>,
) {
    let repo = Arc::new(payment_repo::MemPaymentRepo::new());
    let user_repo: Arc<dyn UserRepo> = repo.clone();
    let transaction_repo: Arc<dyn TransactionRepo> = repo.clone();
    let health_check: Arc<dyn HealthCheck> = repo;
    (user_repo, transaction_repo, health_check)
}
