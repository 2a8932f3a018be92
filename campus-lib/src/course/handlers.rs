use crate::course::{
    AddMemberRequest, CourseList, CreateAssignmentRequest, CreateCourseRequest, CreateUserRequest,
};
use crate::error::HandlerError;
use crate::tracing::record_entity;
use actix_web::{web, HttpResponse, Responder};
use campus_repo::course_repo::{CourseRepo, CourseRepoError};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::RootSpan;

#[get("/courses/")]
pub async fn get_all_courses(
    course_repo: web::Data<Arc<dyn CourseRepo>>,
) -> Result<impl Responder, HandlerError> {
    let courses = course_repo.get_all_courses().await?;
    Ok(HttpResponse::Ok().json(CourseList { courses }))
}

#[post("/courses/")]
pub async fn create_course(
    course_repo: web::Data<Arc<dyn CourseRepo>>,
    new_course: web::Json<CreateCourseRequest>,
) -> Result<impl Responder, HandlerError> {
    let new_course = new_course.into_inner().validate()?;
    let course = course_repo.create_course(new_course).await?;
    info!(course_id = course.id, "Created course");
    Ok(HttpResponse::Created().json(course))
}

#[get("/courses/{course_id}/")]
pub async fn get_course(
    course_repo: web::Data<Arc<dyn CourseRepo>>,
    course_id: web::Path<i64>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let course_id = course_id.into_inner();
    record_entity(&root_span, course_id);
    let course = course_repo.get_course(course_id).await?;
    Ok(HttpResponse::Ok().json(course))
}

#[delete("/courses/{course_id}/")]
pub async fn delete_course(
    course_repo: web::Data<Arc<dyn CourseRepo>>,
    course_id: web::Path<i64>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let course_id = course_id.into_inner();
    record_entity(&root_span, course_id);
    let course = course_repo.delete_course(course_id).await?;
    info!(course_id, "Deleted course");
    Ok(HttpResponse::Ok().json(course))
}

#[post("/courses/{course_id}/assignment/")]
pub async fn create_assignment(
    course_repo: web::Data<Arc<dyn CourseRepo>>,
    course_id: web::Path<i64>,
    new_assignment: web::Json<CreateAssignmentRequest>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let course_id = course_id.into_inner();
    record_entity(&root_span, course_id);

    // an unknown course is reported before any missing fields
    if !course_repo.course_exists(course_id).await? {
        return Err(CourseRepoError::CourseNotFound(course_id).into());
    }
    let new_assignment = new_assignment.into_inner().validate()?;

    let assignment = course_repo
        .create_assignment(course_id, new_assignment)
        .await?;
    info!(course_id, assignment_id = assignment.id, "Created assignment");
    Ok(HttpResponse::Created().json(assignment))
}

#[get("/assignments/{assignment_id}/")]
pub async fn get_assignment(
    course_repo: web::Data<Arc<dyn CourseRepo>>,
    assignment_id: web::Path<i64>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let assignment_id = assignment_id.into_inner();
    record_entity(&root_span, assignment_id);
    let assignment = course_repo.get_assignment(assignment_id).await?;
    Ok(HttpResponse::Ok().json(assignment))
}

#[post("/courses/{course_id}/add/")]
pub async fn add_user_to_course(
    course_repo: web::Data<Arc<dyn CourseRepo>>,
    course_id: web::Path<i64>,
    member: web::Json<AddMemberRequest>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let course_id = course_id.into_inner();
    record_entity(&root_span, course_id);

    if !course_repo.course_exists(course_id).await? {
        return Err(CourseRepoError::CourseNotFound(course_id).into());
    }
    let member = member.into_inner();
    let role = member.role()?;
    let user_id = member
        .user_id
        .ok_or_else(|| HandlerError::UnknownReference("cannot find this user".to_string()))?;

    let course = course_repo
        .add_member(course_id, user_id, role)
        .await
        .map_err(|e| match e {
            CourseRepoError::UserNotFound(_) => {
                HandlerError::UnknownReference("cannot find this user".to_string())
            }
            e => e.into(),
        })?;
    info!(course_id, user_id, role = %role, "Added user to course");
    Ok(HttpResponse::Ok().json(course))
}

#[post("/users/")]
pub async fn create_user(
    course_repo: web::Data<Arc<dyn CourseRepo>>,
    new_user: web::Json<CreateUserRequest>,
) -> Result<impl Responder, HandlerError> {
    let new_user = new_user.into_inner().validate()?;
    let user = course_repo.create_user(new_user).await?;
    info!(user_id = user.id, "Created user");
    Ok(HttpResponse::Created().json(user))
}

#[get("/users/{user_id}/")]
pub async fn get_user(
    course_repo: web::Data<Arc<dyn CourseRepo>>,
    user_id: web::Path<i64>,
    root_span: RootSpan,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    record_entity(&root_span, user_id);
    let user = course_repo.get_user(user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}
