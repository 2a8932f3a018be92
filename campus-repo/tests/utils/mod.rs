pub mod generator;

use campus_repo::course_repo::CourseRepo;
use campus_repo::transaction_repo::TransactionRepo;
use campus_repo::user_repo::UserRepo;
use std::sync::Arc;

const TEST_DATABASE_URL: &str = "sqlite::memory:";

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

#[allow(dead_code)]
pub async fn build_course_repo(repo_type: RepoType) -> Arc<dyn CourseRepo> {
    let (course_repo, _health_check) = match repo_type {
        RepoType::SQLx => campus_repo::sqlx_repo::create_course_repos(TEST_DATABASE_URL, true)
            .await
            .unwrap(),
        RepoType::Mem => campus_repo::mem_repo::create_course_repos(),
    };
    course_repo
}

#[allow(dead_code)]
pub async fn build_payment_repos(
    repo_type: RepoType,
) -> (Arc<dyn UserRepo>, Arc<dyn TransactionRepo>) {
    let (user_repo, transaction_repo, _health_check) = match repo_type {
        RepoType::SQLx => campus_repo::sqlx_repo::create_payment_repos(TEST_DATABASE_URL, true)
            .await
            .unwrap(),
        RepoType::Mem => campus_repo::mem_repo::create_payment_repos(),
    };
    (user_repo, transaction_repo)
}
