use async_trait::async_trait;
use parsflix_model::{SessionId, UserId};
use sqlx::PgPool;

use crate::database::ports::{
    NewSession, SessionRecord, SessionRepository,
};
use crate::error::Result;

use super::rows::SessionRow;

const SESSION_COLUMNS: &str =
    "id, user_id, token_hash, expires_at, revoked, created_at";

#[derive(Debug, Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn insert(&self, session: &NewSession) -> Result<SessionRecord> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "INSERT INTO sessions (id, user_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(SessionId::new().to_uuid())
        .bind(session.user_id.to_uuid())
        .bind(&session.token_hash)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(SessionRecord::from(row))
    }

    async fn find_active(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE token_hash = $1 AND NOT revoked AND expires_at > NOW()"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SessionRecord::from))
    }

    async fn revoke(&self, id: SessionId) -> Result<bool> {
        let done = sqlx::query(
            "UPDATE sessions SET revoked = TRUE
             WHERE id = $1 AND NOT revoked",
        )
        .bind(id.to_uuid())
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> Result<u64> {
        let done = sqlx::query(
            "UPDATE sessions SET revoked = TRUE
             WHERE user_id = $1 AND NOT revoked",
        )
        .bind(user_id.to_uuid())
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected())
    }
}
