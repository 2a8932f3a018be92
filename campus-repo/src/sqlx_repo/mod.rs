mod course_repo;
mod schema;
mod transaction_repo;
mod user_repo;

use crate::course_repo::CourseRepo;
use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;
use crate::HealthCheck;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{query, query_scalar, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

pub struct SQLxRepo {
    pool: Pool<Sqlite>,
}

impl SQLxRepo {
    /// Opens the store behind a single reused connection. The connection never expires, so an
    /// in-memory database lives as long as the repo.
    pub async fn connect(database_url: &str) -> Result<SQLxRepo, anyhow::Error> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to connect to {}", database_url))?;
        Ok(SQLxRepo { pool })
    }

    #[instrument(skip(self, drop_statements, create_statements))]
    async fn prepare_schema(
        &self,
        reset: bool,
        drop_statements: &[&str],
        create_statements: &[&str],
    ) -> Result<(), anyhow::Error> {
        if reset {
            warn!("Dropping existing tables");
            for statement in drop_statements {
                query(statement)
                    .execute(&self.pool)
                    .await
                    .context("Unable to drop table")?;
            }
        }
        for statement in create_statements {
            query(statement)
                .execute(&self.pool)
                .await
                .context("Unable to create table")?;
        }
        info!("Schema ready");
        Ok(())
    }
}

pub async fn create_course_repos(
    database_url: &str,
    reset: bool,
) -> Result<(Arc<dyn CourseRepo>, Arc<dyn HealthCheck>), anyhow::Error> {
    let repo = SQLxRepo::connect(database_url).await?;
    repo.prepare_schema(reset, &schema::DROP_COURSE_TABLES, &schema::COURSE_TABLES)
        .await?;

    let repo = Arc::new(repo);
    let course_repo: Arc<dyn CourseRepo> = repo.clone();
    let health_check: Arc<dyn HealthCheck> = repo;
    Ok((course_repo, health_check))
}

pub async fn create_payment_repos(
    database_url: &str,
    reset: bool,
) -> Result<
    (
        Arc<dyn UserRepo>,
        Arc<dyn TransactionRepo>,
        Arc<dyn HealthCheck>,
    ),
    anyhow::Error,
> {
    let repo = SQLxRepo::connect(database_url).await?;
    repo.prepare_schema(reset, &schema::DROP_PAYMENT_TABLES, &schema::PAYMENT_TABLES)
        .await?;

    let repo = Arc::new(repo);
    let user_repo: Arc<dyn UserRepo> = repo.clone();
    let transaction_repo: Arc<dyn TransactionRepo> = repo.clone();
    let health_check: Arc<dyn HealthCheck> = repo;
    Ok((user_repo, transaction_repo, health_check))
}

#[async_trait]
impl HealthCheck for SQLxRepo {
    async fn check(&self) -> bool {
        match query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(%e, "Health check failed");
                false
            }
        }
    }
}
