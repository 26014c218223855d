//! Photo repository for database operations

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::Photo;

/// Photo repository
#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    /// Create a new photo repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a photo row
    pub async fn create(&self, photo: &Photo) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_photos (id, user_id, url)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(photo.id)
        .bind(photo.user_id)
        .bind(&photo.url)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// Find a photo by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Photo>> {
        let row = sqlx::query("SELECT id, user_id, url FROM user_photos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(photo_from_row).transpose()
    }

    /// All photos of a user, oldest first
    pub async fn list_by_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Photo>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, url
            FROM user_photos
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        rows.iter().map(photo_from_row).collect()
    }

    /// Delete a photo owned by the given user
    pub async fn delete(&self, user_id: Uuid, photo_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM user_photos WHERE id = $1 AND user_id = $2")
            .bind(photo_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}

fn photo_from_row(row: &PgRow) -> DatabaseResult<Photo> {
    Ok(Photo {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        user_id: row.try_get("user_id").map_err(DatabaseError::Query)?,
        url: row.try_get("url").map_err(DatabaseError::Query)?,
    })
}
