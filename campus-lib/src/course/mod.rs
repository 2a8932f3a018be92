use crate::error::HandlerError;
use actix_web::{web, Scope};
use campus_repo::course_repo::{Course, MemberRole, NewAssignment, NewCourse, NewUser};
use serde::{Deserialize, Serialize};

mod handlers;

pub fn course_service() -> Scope {
    web::scope("/api")
        .service(handlers::get_all_courses)
        .service(handlers::create_course)
        .service(handlers::get_course)
        .service(handlers::delete_course)
        .service(handlers::create_assignment)
        .service(handlers::get_assignment)
        .service(handlers::add_user_to_course)
        .service(handlers::create_user)
        .service(handlers::get_user)
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CourseList {
    pub courses: Vec<Course>,
}

#[derive(Deserialize, Debug)]
pub struct CreateCourseRequest {
    pub code: Option<String>,
    pub name: Option<String>,
}

impl CreateCourseRequest {
    pub fn validate(self) -> Result<NewCourse, HandlerError> {
        match (self.code, self.name) {
            (Some(code), Some(name)) => Ok(NewCourse::new(code, name)),
            _ => Err(HandlerError::Validation(
                "didn't provide code or name".to_string(),
            )),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CreateAssignmentRequest {
    pub title: Option<String>,
    pub due_date: Option<i64>,
}

impl CreateAssignmentRequest {
    pub fn validate(self) -> Result<NewAssignment, HandlerError> {
        match (self.title, self.due_date) {
            (Some(title), Some(due_date)) => Ok(NewAssignment::new(title, due_date)),
            _ => Err(HandlerError::Validation("didn't provide info".to_string())),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub netid: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(self) -> Result<NewUser, HandlerError> {
        match (self.name, self.netid) {
            (Some(name), Some(netid)) => Ok(NewUser::new(name, netid)),
            _ => Err(HandlerError::Validation(
                "didn't provide netid or name".to_string(),
            )),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct AddMemberRequest {
    pub user_id: Option<i64>,
    #[serde(rename = "type")]
    pub role: Option<String>,
}

impl AddMemberRequest {
    /// A missing `type` adds the user as a student.
    pub fn role(&self) -> Result<MemberRole, HandlerError> {
        match &self.role {
            None => Ok(MemberRole::Student),
            Some(role) => role
                .parse()
                .map_err(|_| HandlerError::Validation(format!("invalid member type {}", role))),
        }
    }
}
