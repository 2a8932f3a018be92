use crate::course_repo::CourseRepoError::{AssignmentNotFound, CourseNotFound, UserNotFound};
use crate::course_repo::{
    Assignment, AssignmentSummary, Course, CourseRepo, CourseRepoError, CourseSummary,
    MemberRole, NewAssignment, NewCourse, NewUser, User, UserSummary,
};
use crate::HealthCheck;
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

struct AssignmentEntry {
    title: String,
    due_date: i64,
    course_id: i64,
}

struct State {
    courses: BTreeMap<i64, CourseSummary>,
    assignments: BTreeMap<i64, AssignmentEntry>,
    users: BTreeMap<i64, UserSummary>,
    memberships: BTreeMap<(i64, i64), MemberRole>,
    next_course_id: i64,
    next_assignment_id: i64,
    next_user_id: i64,
}

impl State {
    fn allocate(counter: &mut i64) -> i64 {
        let id = *counter;
        *counter += 1;
        id
    }

    fn course(&self, course_id: i64) -> Result<Course, CourseRepoError> {
        let summary = self
            .courses
            .get(&course_id)
            .ok_or(CourseNotFound(course_id))?
            .clone();

        let assignments = self
            .assignments
            .iter()
            .filter(|(_, a)| a.course_id == course_id)
            .map(|(id, a)| AssignmentSummary {
                id: *id,
                title: a.title.clone(),
                due_date: a.due_date,
            })
            .collect();

        let members = self
            .memberships
            .range((course_id, i64::MIN)..=(course_id, i64::MAX))
            .map(|((_, user_id), role)| {
                let user = self.users.get(user_id).ok_or_else(|| {
                    anyhow!("Course {} has a member {} with no user", course_id, user_id)
                })?;
                Ok((user.clone(), *role))
            })
            .collect::<Result<Vec<(UserSummary, MemberRole)>, CourseRepoError>>()?;

        Ok(Course::from_parts(summary, assignments, members))
    }

    fn assignment(&self, assignment_id: i64) -> Result<Assignment, CourseRepoError> {
        let entry = self
            .assignments
            .get(&assignment_id)
            .ok_or(AssignmentNotFound(assignment_id))?;
        let course = self
            .courses
            .get(&entry.course_id)
            .ok_or_else(|| {
                anyhow!(
                    "Assignment {} belongs to missing course {}",
                    assignment_id,
                    entry.course_id
                )
            })?
            .clone();
        Ok(Assignment {
            id: assignment_id,
            title: entry.title.clone(),
            due_date: entry.due_date,
            course,
        })
    }

    fn user(&self, user_id: i64) -> Result<User, CourseRepoError> {
        let summary = self.users.get(&user_id).ok_or(UserNotFound(user_id))?;
        let courses = self
            .memberships
            .keys()
            .filter(|(_, member_id)| *member_id == user_id)
            .filter_map(|(course_id, _)| self.courses.get(course_id).cloned())
            .collect();
        Ok(User {
            id: summary.id,
            name: summary.name.clone(),
            netid: summary.netid.clone(),
            courses,
        })
    }
}

pub struct MemCourseRepo {
    state: RwLock<State>,
}

impl MemCourseRepo {
    pub fn new() -> MemCourseRepo {
        let state = State {
            courses: BTreeMap::new(),
            assignments: BTreeMap::new(),
            users: BTreeMap::new(),
            memberships: BTreeMap::new(),
            next_course_id: 1,
            next_assignment_id: 1,
            next_user_id: 1,
        };
        MemCourseRepo {
            state: RwLock::new(state),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

#[async_trait]
impl CourseRepo for MemCourseRepo {
    async fn get_all_courses(&self) -> Result<Vec<Course>, CourseRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .courses
            .keys()
            .map(|course_id| read_guard.course(*course_id))
            .collect()
    }

    async fn get_course(&self, course_id: i64) -> Result<Course, CourseRepoError> {
        let read_guard = self.read_lock()?;
        read_guard.course(course_id)
    }

    async fn course_exists(&self, course_id: i64) -> Result<bool, CourseRepoError> {
        let read_guard = self.read_lock()?;
        Ok(read_guard.courses.contains_key(&course_id))
    }

    async fn create_course(&self, new_course: NewCourse) -> Result<Course, CourseRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = State::allocate(&mut write_guard.next_course_id);
        write_guard.courses.insert(
            id,
            CourseSummary {
                id,
                code: new_course.code,
                name: new_course.name,
            },
        );
        write_guard.course(id)
    }

    async fn delete_course(&self, course_id: i64) -> Result<Course, CourseRepoError> {
        let mut write_guard = self.write_lock()?;

        let course = write_guard.course(course_id)?;
        write_guard.courses.remove(&course_id);
        write_guard
            .assignments
            .retain(|_, assignment| assignment.course_id != course_id);
        write_guard
            .memberships
            .retain(|(member_course_id, _), _| *member_course_id != course_id);
        Ok(course)
    }

    async fn get_assignment(&self, assignment_id: i64) -> Result<Assignment, CourseRepoError> {
        let read_guard = self.read_lock()?;
        read_guard.assignment(assignment_id)
    }

    async fn create_assignment(
        &self,
        course_id: i64,
        new_assignment: NewAssignment,
    ) -> Result<Assignment, CourseRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.courses.contains_key(&course_id) {
            return Err(CourseNotFound(course_id));
        }
        let id = State::allocate(&mut write_guard.next_assignment_id);
        write_guard.assignments.insert(
            id,
            AssignmentEntry {
                title: new_assignment.title,
                due_date: new_assignment.due_date,
                course_id,
            },
        );
        write_guard.assignment(id)
    }

    async fn add_member(
        &self,
        course_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<Course, CourseRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.courses.contains_key(&course_id) {
            return Err(CourseNotFound(course_id));
        }
        if !write_guard.users.contains_key(&user_id) {
            return Err(UserNotFound(user_id));
        }
        write_guard.memberships.insert((course_id, user_id), role);
        write_guard.course(course_id)
    }

    async fn get_user(&self, user_id: i64) -> Result<User, CourseRepoError> {
        let read_guard = self.read_lock()?;
        read_guard.user(user_id)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, CourseRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = State::allocate(&mut write_guard.next_user_id);
        write_guard.users.insert(
            id,
            UserSummary {
                id,
                name: new_user.name,
                netid: new_user.netid,
            },
        );
        write_guard.user(id)
    }
}

#[async_trait]
impl HealthCheck for MemCourseRepo {
    async fn check(&self) -> bool {
        self.read_lock().is_ok()
    }
}
