//! User repository for database operations

use chrono::{DateTime, NaiveDate, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{Gender, PersonalityType, User, UserChanges};

const USER_COLUMNS: &str = "id, name, surname, bio, gender, birth_date, personality_type, \
     personality_last_attempt, primary_photo, created_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user row
    pub async fn create(&self, user: &User) -> DatabaseResult<()> {
        info!("Creating user: {}", user.id);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, surname, bio, gender, birth_date, personality_type,
                               personality_last_attempt, primary_photo, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.bio)
        .bind(user.gender.map(|gender| gender.as_str()))
        .bind(user.birth_date)
        .bind(user.personality_type.map(|kind| kind.as_str()))
        .bind(user.personality_last_attempt)
        .bind(&user.primary_photo)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Persist every supplied change in one statement and return the new row.
    ///
    /// Absent fields keep their stored value. `bio` carries an explicit flag
    /// so it can be cleared.
    pub async fn update(&self, id: Uuid, changes: &UserChanges) -> DatabaseResult<Option<User>> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let (personality_type, personality_last_attempt) = match changes.personality {
            Some((kind, attempted_at)) => (Some(kind.as_str()), Some(attempted_at)),
            None => (None, None),
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                surname = COALESCE($3, surname),
                bio = CASE WHEN $4 THEN $5 ELSE bio END,
                gender = COALESCE($6, gender),
                birth_date = COALESCE($7, birth_date),
                personality_type = COALESCE($8, personality_type),
                personality_last_attempt = COALESCE($9, personality_last_attempt)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.surname.as_deref())
        .bind(changes.bio.is_some())
        .bind(changes.bio.clone().flatten())
        .bind(changes.gender.map(|gender| gender.as_str()))
        .bind(changes.birth_date)
        .bind(personality_type)
        .bind(personality_last_attempt)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Delete a user together with its photos and tags
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Deleting user: {}", id);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        sqlx::query("DELETE FROM user_tags WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

        sqlx::query("DELETE FROM user_photos WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Set or clear the primary photo reference
    pub async fn set_primary_photo(
        &self,
        id: Uuid,
        reference: Option<&str>,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query("UPDATE users SET primary_photo = $1 WHERE id = $2")
            .bind(reference)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}

fn user_from_row(row: &PgRow) -> DatabaseResult<User> {
    let gender = row
        .try_get::<Option<String>, _>("gender")
        .map_err(DatabaseError::Query)?
        .map(|raw| raw.parse::<Gender>())
        .transpose()
        .map_err(DatabaseError::Decode)?;

    let personality_type = row
        .try_get::<Option<String>, _>("personality_type")
        .map_err(DatabaseError::Query)?
        .map(|raw| raw.parse::<PersonalityType>())
        .transpose()
        .map_err(DatabaseError::Decode)?;

    Ok(User {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        name: row.try_get("name").map_err(DatabaseError::Query)?,
        surname: row.try_get("surname").map_err(DatabaseError::Query)?,
        bio: row.try_get("bio").map_err(DatabaseError::Query)?,
        gender,
        birth_date: row
            .try_get::<Option<NaiveDate>, _>("birth_date")
            .map_err(DatabaseError::Query)?,
        personality_type,
        personality_last_attempt: row
            .try_get::<Option<DateTime<Utc>>, _>("personality_last_attempt")
            .map_err(DatabaseError::Query)?,
        primary_photo: row.try_get("primary_photo").map_err(DatabaseError::Query)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
    })
}
