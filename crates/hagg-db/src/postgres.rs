use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::model::User;
use crate::store::{UserStore, UserStoreError};

/// Connects to PostgreSQL and applies pending migrations.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, uid), fields(db.operation = "SELECT", db.sql.table = "users"))]
    async fn find_by_uid(&self, uid: &str) -> Result<User, UserStoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, uid, display_name, first_name, last_name, created_at, updated_at
            FROM users
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(UserStoreError::NotFound)
    }
}
