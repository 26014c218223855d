//! Profile orchestration
//!
//! [`ProfileService`] validates input, persists it through a
//! [`ProfileStore`] and announces the outcome on the event queues. Events
//! are only published after the storage write has succeeded; a failed
//! publish is reported to the caller but the write is not rolled back.

use chrono::Utc;
use common::error::DatabaseError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    messaging::{EventPublisher, MessagingError},
    models::{
        CreateUserRequest, Photo, Tag, UpdateProfileRequest, User, UserChanges, UserDetails,
        events::{AnketEvent, PhotoEvent, TagsEvent},
    },
    object_store::{PhotoStorage, photo_object_key},
    repositories::ProfileStore,
    validation::{
        validate_image_content_type, validate_name, validate_personality_type,
        validate_photo_url, validate_surname, validate_tag,
    },
};

pub mod defaults;
pub mod locks;
pub mod primary_photo;

#[cfg(test)]
pub(crate) mod testing;

pub use defaults::AnketDefaults;
pub use locks::UserLocks;
pub use primary_photo::{PrimaryPhotoDecision, decide_primary_photo};

/// Errors surfaced by profile operations
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("Object storage error: {0}")]
    ObjectStorage(#[source] anyhow::Error),
}

pub type ProfileResult<T> = Result<T, ProfileError>;

fn user_not_found() -> ProfileError {
    ProfileError::NotFound("User not found".to_string())
}

fn photo_not_found() -> ProfileError {
    ProfileError::NotFound("Photo not found".to_string())
}

/// Empty strings mean "no value" for optional text fields
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Profile operations shared by all handlers
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
    publisher: Arc<dyn EventPublisher>,
    photo_storage: Arc<dyn PhotoStorage>,
    defaults: AnketDefaults,
    locks: UserLocks,
    photo_prefix: String,
}

impl ProfileService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        publisher: Arc<dyn EventPublisher>,
        photo_storage: Arc<dyn PhotoStorage>,
        photo_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            publisher,
            photo_storage,
            defaults: AnketDefaults::default(),
            locks: UserLocks::new(),
            photo_prefix: photo_prefix.into(),
        }
    }

    /// Replace the anket defaults
    pub fn with_defaults(mut self, defaults: AnketDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Whether the backing store answers
    pub async fn is_storage_healthy(&self) -> bool {
        self.store.ping().await
    }

    /// Create a user and announce a default anket for it
    pub async fn create_user(&self, request: CreateUserRequest) -> ProfileResult<User> {
        validate_name(&request.name).map_err(ProfileError::Validation)?;
        validate_surname(&request.surname).map_err(ProfileError::Validation)?;

        let user = User {
            id: Uuid::new_v4(),
            name: request.name,
            surname: request.surname,
            bio: non_empty(request.bio),
            gender: request.gender,
            birth_date: None,
            personality_type: None,
            personality_last_attempt: None,
            primary_photo: None,
            created_at: Utc::now(),
        };

        self.store.create_user(&user).await?;
        info!(user_id = %user.id, "User created");

        let anket = self.defaults.for_new_user(user.id, user.gender);
        self.announce_anket(&anket).await?;

        Ok(user)
    }

    /// User with its photos and tags
    pub async fn get_user(&self, user_id: Uuid) -> ProfileResult<UserDetails> {
        let user = self.require_user(user_id).await?;
        let photos = self.store.list_photos(user_id).await?;
        let tags = self.store.list_tags(user_id).await?;

        Ok(UserDetails { user, photos, tags })
    }

    /// Apply a partial profile update.
    ///
    /// Every supplied field is validated before anything is written, and
    /// all of them are persisted together. An anket is announced when the
    /// update touches gender or birth date.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> ProfileResult<User> {
        let changes = Self::profile_changes(request)?;

        if changes.is_empty() {
            return self.require_user(user_id).await;
        }

        let _guard = self.locks.lock(user_id).await;

        let updated = self
            .store
            .update_user(user_id, &changes)
            .await?
            .ok_or_else(user_not_found)?;
        info!(user_id = %user_id, "Profile updated");

        if let Some(anket) =
            self.defaults
                .for_update(user_id, changes.gender, changes.birth_date, &updated)
        {
            self.announce_anket(&anket).await?;
        }

        Ok(updated)
    }

    fn profile_changes(request: UpdateProfileRequest) -> ProfileResult<UserChanges> {
        if let Some(name) = &request.name {
            validate_name(name).map_err(ProfileError::Validation)?;
        }
        if let Some(surname) = &request.surname {
            validate_surname(surname).map_err(ProfileError::Validation)?;
        }
        let personality = match request.personality_type.as_deref() {
            Some(code) => Some((
                validate_personality_type(code).map_err(ProfileError::Validation)?,
                Utc::now(),
            )),
            None => None,
        };

        Ok(UserChanges {
            name: request.name,
            surname: request.surname,
            bio: request.bio.map(|bio| (!bio.is_empty()).then_some(bio)),
            gender: request.gender,
            birth_date: request.birth_date,
            personality,
        })
    }

    /// Remove a user together with its photos and tags
    pub async fn delete_user(&self, user_id: Uuid) -> ProfileResult<()> {
        let _guard = self.locks.lock(user_id).await;

        if !self.store.delete_user(user_id).await? {
            return Err(user_not_found());
        }

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    pub async fn list_photos(&self, user_id: Uuid) -> ProfileResult<Vec<Photo>> {
        self.require_user(user_id).await?;
        Ok(self.store.list_photos(user_id).await?)
    }

    /// Attach an already stored photo to a user. Emits no event.
    pub async fn add_photo(&self, user_id: Uuid, url: &str) -> ProfileResult<Photo> {
        validate_photo_url(url).map_err(ProfileError::Validation)?;

        let photo = Photo {
            id: Uuid::new_v4(),
            user_id,
            url: url.to_string(),
        };
        self.require_user(user_id).await?;
        self.insert_photo(&photo).await?;

        Ok(photo)
    }

    /// Store an uploaded image and attach it to the user.
    ///
    /// The object key embeds the photo id. Emits no event.
    pub async fn upload_photo(
        &self,
        user_id: Uuid,
        content_type: &str,
        body: Vec<u8>,
    ) -> ProfileResult<Photo> {
        let extension = validate_image_content_type(content_type).map_err(ProfileError::Validation)?;
        if body.is_empty() {
            return Err(ProfileError::Validation("Photo is required".to_string()));
        }
        self.require_user(user_id).await?;

        let photo_id = Uuid::new_v4();
        let key = photo_object_key(&self.photo_prefix, photo_id, extension);
        let stored_content_type = if extension == "png" { "image/png" } else { "image/jpeg" };

        self.photo_storage
            .upload(&key, stored_content_type, body)
            .await
            .map_err(|e| {
                error!(user_id = %user_id, "Failed to upload photo: {:#}", e);
                ProfileError::ObjectStorage(e)
            })?;

        let photo = Photo {
            id: photo_id,
            user_id,
            url: key,
        };
        self.insert_photo(&photo).await?;

        Ok(photo)
    }

    async fn insert_photo(&self, photo: &Photo) -> ProfileResult<()> {
        self.store.add_photo(photo).await?;
        info!(user_id = %photo.user_id, photo_id = %photo.id, "Photo added");
        Ok(())
    }

    /// URL the client is redirected to for a photo
    pub async fn photo_access_url(&self, photo_id: Uuid) -> ProfileResult<String> {
        let photo = self
            .store
            .find_photo(photo_id)
            .await?
            .ok_or_else(photo_not_found)?;

        self.photo_storage
            .access_url(&photo.url)
            .await
            .map_err(ProfileError::ObjectStorage)
    }

    /// Make one of the user's photos the primary photo and announce it
    pub async fn set_primary_photo(&self, user_id: Uuid, photo_id: Uuid) -> ProfileResult<Photo> {
        let _guard = self.locks.lock(user_id).await;

        let photos = self.store.list_photos(user_id).await?;
        let photo = photos
            .into_iter()
            .find(|photo| photo.id == photo_id)
            .ok_or_else(photo_not_found)?;

        if !self.store.set_primary_photo(user_id, Some(&photo.url)).await? {
            return Err(user_not_found());
        }
        info!(user_id = %user_id, photo_id = %photo_id, "Primary photo set");

        self.announce_photo(&PhotoEvent::new(user_id, photo.url.clone()))
            .await?;

        Ok(photo)
    }

    /// Remove a photo, keeping the primary-photo reference consistent.
    ///
    /// The surviving primary photo is re-announced. When the primary photo
    /// itself is removed, the first remaining photo is promoted and
    /// announced; with nothing left the reference is cleared silently.
    pub async fn remove_photo(
        &self,
        user_id: Uuid,
        photo_id: Uuid,
    ) -> ProfileResult<PrimaryPhotoDecision> {
        let _guard = self.locks.lock(user_id).await;

        let user = self.require_user(user_id).await?;
        let photos = self.store.list_photos(user_id).await?;
        let removed = photos
            .iter()
            .find(|photo| photo.id == photo_id)
            .ok_or_else(photo_not_found)?;

        let decision = decide_primary_photo(user.primary_photo.as_deref(), removed, &photos);

        if !self.store.remove_photo(user_id, photo_id).await? {
            return Err(photo_not_found());
        }
        info!(user_id = %user_id, photo_id = %photo_id, "Photo removed");

        match &decision {
            PrimaryPhotoDecision::KeepCurrent(path) => {
                self.announce_photo(&PhotoEvent::new(user_id, path.clone()))
                    .await?;
            }
            PrimaryPhotoDecision::Replace(photo) => {
                self.store.set_primary_photo(user_id, Some(&photo.url)).await?;
                info!(user_id = %user_id, photo_id = %photo.id, "Primary photo replaced");
                self.announce_photo(&PhotoEvent::new(user_id, photo.url.clone()))
                    .await?;
            }
            PrimaryPhotoDecision::NoReplacement => {
                if user.primary_photo.is_some() {
                    self.store.set_primary_photo(user_id, None).await?;
                }
                warn!(user_id = %user_id, "No photo left to use as primary");
            }
        }

        Ok(decision)
    }

    /// Attach a tag and announce the user's full tag set
    pub async fn add_tag(&self, user_id: Uuid, value: &str) -> ProfileResult<Tag> {
        validate_tag(value).map_err(ProfileError::Validation)?;

        let _guard = self.locks.lock(user_id).await;
        self.require_user(user_id).await?;

        let tag = Tag {
            id: Uuid::new_v4(),
            user_id,
            value: value.to_string(),
        };
        self.store.add_tag(&tag).await?;
        info!(user_id = %user_id, tag_id = %tag.id, "Tag added");

        self.announce_tag_set(user_id).await?;
        Ok(tag)
    }

    pub async fn list_tags(&self, user_id: Uuid) -> ProfileResult<Vec<Tag>> {
        self.require_user(user_id).await?;
        Ok(self.store.list_tags(user_id).await?)
    }

    /// Detach a tag and announce the remaining tag set
    pub async fn remove_tag(&self, user_id: Uuid, tag_id: Uuid) -> ProfileResult<()> {
        let _guard = self.locks.lock(user_id).await;

        if !self.store.remove_tag(user_id, tag_id).await? {
            return Err(ProfileError::NotFound("Tag not found".to_string()));
        }
        info!(user_id = %user_id, tag_id = %tag_id, "Tag removed");

        self.announce_tag_set(user_id).await
    }

    async fn require_user(&self, user_id: Uuid) -> ProfileResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(user_not_found)
    }

    async fn announce_tag_set(&self, user_id: Uuid) -> ProfileResult<()> {
        let tags = self.store.list_tags(user_id).await?;
        let event = TagsEvent::from_tags(user_id, &tags);

        self.publisher.publish_tags(&event).await.map_err(|e| {
            error!(user_id = %user_id, "Failed to publish tags: {}", e);
            ProfileError::Messaging(e)
        })
    }

    async fn announce_anket(&self, event: &AnketEvent) -> ProfileResult<()> {
        self.publisher.publish_anket(event).await.map_err(|e| {
            error!(user_id = %event.user_id, "Failed to publish anket: {}", e);
            ProfileError::Messaging(e)
        })
    }

    async fn announce_photo(&self, event: &PhotoEvent) -> ProfileResult<()> {
        self.publisher.publish_photo(event).await.map_err(|e| {
            error!(user_id = %event.user_id, "Failed to publish photo: {}", e);
            ProfileError::Messaging(e)
        })
    }
}
