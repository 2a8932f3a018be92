use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[async_trait]
pub trait CourseRepo: Sync + Send {
    async fn get_all_courses(&self) -> Result<Vec<Course>, CourseRepoError>;

    async fn get_course(&self, course_id: i64) -> Result<Course, CourseRepoError>;

    /// Looks the course up without loading its assignments or members.
    async fn course_exists(&self, course_id: i64) -> Result<bool, CourseRepoError>;

    async fn create_course(&self, new_course: NewCourse) -> Result<Course, CourseRepoError>;

    /// Removes the course together with its assignments and memberships. Member users are kept.
    async fn delete_course(&self, course_id: i64) -> Result<Course, CourseRepoError>;

    async fn get_assignment(&self, assignment_id: i64) -> Result<Assignment, CourseRepoError>;

    async fn create_assignment(
        &self,
        course_id: i64,
        new_assignment: NewAssignment,
    ) -> Result<Assignment, CourseRepoError>;

    /// Adds the user to the course, or changes their role if they are already a member.
    async fn add_member(
        &self,
        course_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<Course, CourseRepoError>;

    async fn get_user(&self, user_id: i64) -> Result<User, CourseRepoError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, CourseRepoError>;
}

#[derive(Error, Debug)]
pub enum CourseRepoError {
    #[error("Course {0} not found")]
    CourseNotFound(i64),
    #[error("Assignment {0} not found")]
    AssignmentNotFound(i64),
    #[error("User {0} not found")]
    UserNotFound(i64),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Instructor,
    Student,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Instructor => "instructor",
            MemberRole::Student => "student",
        }
    }
}

impl Display for MemberRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = anyhow::Error;

    /// Accepts both the singular role and the plural list name used in course responses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instructor" | "instructors" => Ok(MemberRole::Instructor),
            "student" | "students" => Ok(MemberRole::Student),
            _ => Err(anyhow::anyhow!("Unknown member role {}", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct CourseSummary {
    pub id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub assignments: Vec<AssignmentSummary>,
    pub instructors: Vec<UserSummary>,
    pub students: Vec<UserSummary>,
}

impl Course {
    /// Builds the course view, splitting members into instructors and students.
    pub fn from_parts(
        summary: CourseSummary,
        assignments: Vec<AssignmentSummary>,
        members: Vec<(UserSummary, MemberRole)>,
    ) -> Course {
        let mut instructors = Vec::new();
        let mut students = Vec::new();
        for (user, role) in members {
            match role {
                MemberRole::Instructor => instructors.push(user),
                MemberRole::Student => students.push(user),
            }
        }
        Course {
            id: summary.id,
            code: summary.code,
            name: summary.name,
            assignments,
            instructors,
            students,
        }
    }

    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
}

impl NewCourse {
    pub const fn new(code: String, name: String) -> NewCourse {
        NewCourse { code, name }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct AssignmentSummary {
    pub id: i64,
    pub title: String,
    pub due_date: i64,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub due_date: i64,
    pub course: CourseSummary,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub due_date: i64,
}

impl NewAssignment {
    pub const fn new(title: String, due_date: i64) -> NewAssignment {
        NewAssignment { title, due_date }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub netid: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub netid: String,
    pub courses: Vec<CourseSummary>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct NewUser {
    pub name: String,
    pub netid: String,
}

impl NewUser {
    pub const fn new(name: String, netid: String) -> NewUser {
        NewUser { name, netid }
    }
}
