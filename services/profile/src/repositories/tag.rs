//! Tag repository for database operations

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::Tag;

/// Tag repository
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a tag row
    pub async fn create(&self, tag: &Tag) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO user_tags (id, user_id, value) VALUES ($1, $2, $3)")
            .bind(tag.id)
            .bind(tag.user_id)
            .bind(&tag.value)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// All tags of a user, oldest first
    pub async fn list_by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, value
            FROM user_tags
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        rows.into_iter()
            .map(|row| {
                Ok(Tag {
                    id: row.try_get("id").map_err(DatabaseError::Query)?,
                    user_id: row.try_get("user_id").map_err(DatabaseError::Query)?,
                    value: row.try_get("value").map_err(DatabaseError::Query)?,
                })
            })
            .collect()
    }

    /// Delete a tag owned by the given user
    pub async fn delete(&self, user_id: Uuid, tag_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM user_tags WHERE id = $1 AND user_id = $2")
            .bind(tag_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
