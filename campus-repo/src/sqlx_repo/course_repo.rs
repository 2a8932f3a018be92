use crate::course_repo::CourseRepoError::{AssignmentNotFound, CourseNotFound, UserNotFound};
use crate::course_repo::{
    Assignment, AssignmentSummary, Course, CourseRepo, CourseRepoError, CourseSummary,
    MemberRole, NewAssignment, NewCourse, NewUser, User, UserSummary,
};
use crate::sqlx_repo::SQLxRepo;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct CourseEntry {
    id: i64,
    code: String,
    name: String,
}

impl From<CourseEntry> for CourseSummary {
    fn from(value: CourseEntry) -> Self {
        CourseSummary {
            id: value.id,
            code: value.code,
            name: value.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentEntry {
    id: i64,
    title: String,
    due_date: i64,
}

impl From<AssignmentEntry> for AssignmentSummary {
    fn from(value: AssignmentEntry) -> Self {
        AssignmentSummary {
            id: value.id,
            title: value.title,
            due_date: value.due_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentWithCourseEntry {
    id: i64,
    title: String,
    due_date: i64,
    course_id: i64,
    course_code: String,
    course_name: String,
}

impl From<AssignmentWithCourseEntry> for Assignment {
    fn from(value: AssignmentWithCourseEntry) -> Self {
        Assignment {
            id: value.id,
            title: value.title,
            due_date: value.due_date,
            course: CourseSummary {
                id: value.course_id,
                code: value.course_code,
                name: value.course_name,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserEntry {
    id: i64,
    name: String,
    netid: String,
}

impl From<UserEntry> for UserSummary {
    fn from(value: UserEntry) -> Self {
        UserSummary {
            id: value.id,
            name: value.name,
            netid: value.netid,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberEntry {
    id: i64,
    name: String,
    netid: String,
    role: String,
}

impl MemberEntry {
    fn into_member(self) -> Result<(UserSummary, MemberRole), anyhow::Error> {
        let role = self.role.parse()?;
        let user = UserSummary {
            id: self.id,
            name: self.name,
            netid: self.netid,
        };
        Ok((user, role))
    }
}

impl SQLxRepo {
    #[instrument(skip(self))]
    async fn get_course_entry(
        &self,
        course_id: i64,
    ) -> Result<Option<CourseEntry>, CourseRepoError> {
        let course_entry =
            query_as::<_, CourseEntry>("SELECT id, code, name FROM courses WHERE id = ?")
                .bind(course_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get course {}", course_id))?;
        Ok(course_entry)
    }

    #[instrument(skip(self))]
    async fn get_course_details(&self, course_id: i64) -> Result<Course, CourseRepoError> {
        let course_entry = self
            .get_course_entry(course_id)
            .await?
            .ok_or(CourseNotFound(course_id))?;

        let assignments = query_as::<_, AssignmentEntry>(
            "SELECT id, title, due_date FROM assignments WHERE course_id = ? ORDER BY id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get assignments of course {}", course_id))?
        .into_iter()
        .map(|assignment_entry| assignment_entry.into())
        .collect();

        let members = query_as::<_, MemberEntry>(
            r#"
            SELECT u.id, u.name, u.netid, m.role
            FROM memberships m
                     JOIN course_users u ON u.id = m.user_id
            WHERE m.course_id = ?
            ORDER BY u.id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get members of course {}", course_id))?
        .into_iter()
        .map(MemberEntry::into_member)
        .collect::<Result<Vec<(UserSummary, MemberRole)>, anyhow::Error>>()?;

        Ok(Course::from_parts(course_entry.into(), assignments, members))
    }

    #[instrument(skip(self))]
    async fn get_user_entry(&self, user_id: i64) -> Result<Option<UserEntry>, CourseRepoError> {
        let user_entry =
            query_as::<_, UserEntry>("SELECT id, name, netid FROM course_users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Unable to get user {}", user_id))?;
        Ok(user_entry)
    }
}

#[async_trait]
impl CourseRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_all_courses(&self) -> Result<Vec<Course>, CourseRepoError> {
        let course_ids = query_scalar::<_, i64>("SELECT id FROM courses ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Unable to get courses")?;

        let mut courses = Vec::with_capacity(course_ids.len());
        for course_id in course_ids {
            courses.push(self.get_course_details(course_id).await?);
        }
        Ok(courses)
    }

    #[instrument(skip(self))]
    async fn get_course(&self, course_id: i64) -> Result<Course, CourseRepoError> {
        self.get_course_details(course_id).await
    }

    #[instrument(skip(self))]
    async fn course_exists(&self, course_id: i64) -> Result<bool, CourseRepoError> {
        let id = query_scalar::<_, i64>("SELECT id FROM courses WHERE id = ?")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get course {}", course_id))?;
        Ok(id.is_some())
    }

    #[instrument(skip(self, new_course))]
    async fn create_course(&self, new_course: NewCourse) -> Result<Course, CourseRepoError> {
        let id = query("INSERT INTO courses (code, name) VALUES (?, ?)")
            .bind(new_course.code)
            .bind(new_course.name)
            .execute(&self.pool)
            .await
            .context("Unable to insert course")?
            .last_insert_rowid();

        self.get_course_details(id).await
    }

    #[instrument(skip(self))]
    async fn delete_course(&self, course_id: i64) -> Result<Course, CourseRepoError> {
        let course = self.get_course_details(course_id).await?;

        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;
        query("DELETE FROM memberships WHERE course_id = ?")
            .bind(course_id)
            .execute(&mut *db_transaction)
            .await
            .with_context(|| format!("Unable to delete members of course {}", course_id))?;
        query("DELETE FROM assignments WHERE course_id = ?")
            .bind(course_id)
            .execute(&mut *db_transaction)
            .await
            .with_context(|| format!("Unable to delete assignments of course {}", course_id))?;
        let result = query("DELETE FROM courses WHERE id = ?")
            .bind(course_id)
            .execute(&mut *db_transaction)
            .await
            .with_context(|| format!("Unable to delete course {}", course_id))?;
        if result.rows_affected() == 0 {
            return Err(CourseNotFound(course_id));
        }
        db_transaction
            .commit()
            .await
            .context("Unable to commit transaction")?;

        Ok(course)
    }

    #[instrument(skip(self))]
    async fn get_assignment(&self, assignment_id: i64) -> Result<Assignment, CourseRepoError> {
        let assignment_entry = query_as::<_, AssignmentWithCourseEntry>(
            r#"
            SELECT a.id,
                   a.title,
                   a.due_date,
                   c.id   AS course_id,
                   c.code AS course_code,
                   c.name AS course_name
            FROM assignments a
                     JOIN courses c ON c.id = a.course_id
            WHERE a.id = ?
            "#,
        )
        .bind(assignment_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get assignment {}", assignment_id))?
        .ok_or(AssignmentNotFound(assignment_id))?;
        Ok(assignment_entry.into())
    }

    #[instrument(skip(self, new_assignment))]
    async fn create_assignment(
        &self,
        course_id: i64,
        new_assignment: NewAssignment,
    ) -> Result<Assignment, CourseRepoError> {
        if !self.course_exists(course_id).await? {
            return Err(CourseNotFound(course_id));
        }

        let id = query("INSERT INTO assignments (title, due_date, course_id) VALUES (?, ?, ?)")
            .bind(new_assignment.title)
            .bind(new_assignment.due_date)
            .bind(course_id)
            .execute(&self.pool)
            .await
            .context("Unable to insert assignment")?
            .last_insert_rowid();

        self.get_assignment(id).await
    }

    #[instrument(skip(self))]
    async fn add_member(
        &self,
        course_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<Course, CourseRepoError> {
        if !self.course_exists(course_id).await? {
            return Err(CourseNotFound(course_id));
        }
        if self.get_user_entry(user_id).await?.is_none() {
            return Err(UserNotFound(user_id));
        }

        query(
            r#"
            INSERT INTO memberships (course_id, user_id, role)
            VALUES (?, ?, ?)
            ON CONFLICT (course_id, user_id) DO UPDATE SET role = excluded.role
            "#,
        )
        .bind(course_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Unable to add user {} to course {}", user_id, course_id))?;

        self.get_course_details(course_id).await
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<User, CourseRepoError> {
        let user_entry = self
            .get_user_entry(user_id)
            .await?
            .ok_or(UserNotFound(user_id))?;

        let courses = query_as::<_, CourseEntry>(
            r#"
            SELECT c.id, c.code, c.name
            FROM memberships m
                     JOIN courses c ON c.id = m.course_id
            WHERE m.user_id = ?
            ORDER BY c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get courses of user {}", user_id))?
        .into_iter()
        .map(|course_entry| course_entry.into())
        .collect();

        Ok(User {
            id: user_entry.id,
            name: user_entry.name,
            netid: user_entry.netid,
            courses,
        })
    }

    #[instrument(skip(self, new_user))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, CourseRepoError> {
        let id = query("INSERT INTO course_users (name, netid) VALUES (?, ?)")
            .bind(new_user.name)
            .bind(new_user.netid)
            .execute(&self.pool)
            .await
            .context("Unable to insert user")?
            .last_insert_rowid();

        self.get_user(id).await
    }
}
