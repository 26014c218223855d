//! Repositories for database operations
//!
//! [`ProfileStore`] is the storage interface the orchestrator depends on.
//! [`PgProfileStore`] backs it with PostgreSQL through one repository per
//! table.

use async_trait::async_trait;
use common::{database::health_check, error::DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Photo, Tag, User, UserChanges};

pub mod photo;
pub mod tag;
pub mod user;

pub use photo::PhotoRepository;
pub use tag::TagRepository;
pub use user::UserRepository;

/// Persistence operations needed by the profile service
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_user(&self, user: &User) -> DatabaseResult<()>;

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Apply all changes at once; `None` when the user does not exist
    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> DatabaseResult<Option<User>>;

    /// Remove the user with its photos and tags; `false` when absent
    async fn delete_user(&self, id: Uuid) -> DatabaseResult<bool>;

    /// Set or clear the denormalised primary-photo reference
    async fn set_primary_photo(&self, user_id: Uuid, reference: Option<&str>)
    -> DatabaseResult<bool>;

    async fn add_photo(&self, photo: &Photo) -> DatabaseResult<()>;

    async fn find_photo(&self, id: Uuid) -> DatabaseResult<Option<Photo>>;

    async fn list_photos(&self, user_id: Uuid) -> DatabaseResult<Vec<Photo>>;

    async fn remove_photo(&self, user_id: Uuid, photo_id: Uuid) -> DatabaseResult<bool>;

    async fn add_tag(&self, tag: &Tag) -> DatabaseResult<()>;

    async fn list_tags(&self, user_id: Uuid) -> DatabaseResult<Vec<Tag>>;

    async fn remove_tag(&self, user_id: Uuid, tag_id: Uuid) -> DatabaseResult<bool>;

    /// Whether the backing database answers
    async fn ping(&self) -> bool;
}

/// PostgreSQL-backed profile store
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
    users: UserRepository,
    photos: PhotoRepository,
    tags: TagRepository,
}

impl PgProfileStore {
    /// Create a store sharing one connection pool across repositories
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            photos: PhotoRepository::new(pool.clone()),
            tags: TagRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn create_user(&self, user: &User) -> DatabaseResult<()> {
        self.users.create(user).await
    }

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> DatabaseResult<Option<User>> {
        self.users.update(id, changes).await
    }

    async fn delete_user(&self, id: Uuid) -> DatabaseResult<bool> {
        self.users.delete(id).await
    }

    async fn set_primary_photo(
        &self,
        user_id: Uuid,
        reference: Option<&str>,
    ) -> DatabaseResult<bool> {
        self.users.set_primary_photo(user_id, reference).await
    }

    async fn add_photo(&self, photo: &Photo) -> DatabaseResult<()> {
        self.photos.create(photo).await
    }

    async fn find_photo(&self, id: Uuid) -> DatabaseResult<Option<Photo>> {
        self.photos.find_by_id(id).await
    }

    async fn list_photos(&self, user_id: Uuid) -> DatabaseResult<Vec<Photo>> {
        self.photos.list_by_user(user_id).await
    }

    async fn remove_photo(&self, user_id: Uuid, photo_id: Uuid) -> DatabaseResult<bool> {
        self.photos.delete(user_id, photo_id).await
    }

    async fn add_tag(&self, tag: &Tag) -> DatabaseResult<()> {
        self.tags.create(tag).await
    }

    async fn list_tags(&self, user_id: Uuid) -> DatabaseResult<Vec<Tag>> {
        self.tags.list_by_user(user_id).await
    }

    async fn remove_tag(&self, user_id: Uuid, tag_id: Uuid) -> DatabaseResult<bool> {
        self.tags.delete(user_id, tag_id).await
    }

    async fn ping(&self) -> bool {
        health_check(&self.pool).await
    }
}
