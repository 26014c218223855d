//! In-memory collaborators for service and router tests

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::error::{DatabaseError, DatabaseResult};
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use uuid::Uuid;

use super::{AnketDefaults, ProfileService};
use crate::{
    messaging::{EventPublisher, MessagingError},
    models::{
        Gender, Photo, Tag, User, UserChanges,
        events::{AnketEvent, PhotoEvent, TagsEvent},
    },
    object_store::PhotoStorage,
    repositories::ProfileStore,
};

pub const PHOTO_PREFIX: &str = "pub";

#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    photos: Mutex<Vec<Photo>>,
    tags: Mutex<Vec<Tag>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Make every call fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> DatabaseResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Configuration("store unavailable".to_string()));
        }
        Ok(())
    }

    pub fn insert_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn insert_photo(&self, photo: Photo) {
        self.photos.lock().unwrap().push(photo);
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn photo_count(&self, user_id: Uuid) -> usize {
        self.photos
            .lock()
            .unwrap()
            .iter()
            .filter(|photo| photo.user_id == user_id)
            .count()
    }

    pub fn tag_count(&self, user_id: Uuid) -> usize {
        self.tags
            .lock()
            .unwrap()
            .iter()
            .filter(|tag| tag.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn create_user(&self, user: &User) -> DatabaseResult<()> {
        self.check()?;
        self.insert_user(user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        self.check()?;
        Ok(self.user(id))
    }

    async fn update_user(&self, id: Uuid, changes: &UserChanges) -> DatabaseResult<Option<User>> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(surname) = &changes.surname {
            user.surname = surname.clone();
        }
        if let Some(bio) = &changes.bio {
            user.bio = bio.clone();
        }
        if let Some(gender) = changes.gender {
            user.gender = Some(gender);
        }
        if let Some(birth_date) = changes.birth_date {
            user.birth_date = Some(birth_date);
        }
        if let Some((kind, attempted_at)) = changes.personality {
            user.personality_type = Some(kind);
            user.personality_last_attempt = Some(attempted_at);
        }

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> DatabaseResult<bool> {
        self.check()?;
        self.photos.lock().unwrap().retain(|photo| photo.user_id != id);
        self.tags.lock().unwrap().retain(|tag| tag.user_id != id);
        Ok(self.users.lock().unwrap().remove(&id).is_some())
    }

    async fn set_primary_photo(
        &self,
        user_id: Uuid,
        reference: Option<&str>,
    ) -> DatabaseResult<bool> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&user_id) {
            Some(user) => {
                user.primary_photo = reference.map(str::to_string);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_photo(&self, photo: &Photo) -> DatabaseResult<()> {
        self.check()?;
        self.insert_photo(photo.clone());
        Ok(())
    }

    async fn find_photo(&self, id: Uuid) -> DatabaseResult<Option<Photo>> {
        self.check()?;
        Ok(self
            .photos
            .lock()
            .unwrap()
            .iter()
            .find(|photo| photo.id == id)
            .cloned())
    }

    async fn list_photos(&self, user_id: Uuid) -> DatabaseResult<Vec<Photo>> {
        self.check()?;
        Ok(self
            .photos
            .lock()
            .unwrap()
            .iter()
            .filter(|photo| photo.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn remove_photo(&self, user_id: Uuid, photo_id: Uuid) -> DatabaseResult<bool> {
        self.check()?;
        let mut photos = self.photos.lock().unwrap();
        let before = photos.len();
        photos.retain(|photo| !(photo.user_id == user_id && photo.id == photo_id));
        Ok(photos.len() < before)
    }

    async fn add_tag(&self, tag: &Tag) -> DatabaseResult<()> {
        self.check()?;
        self.tags.lock().unwrap().push(tag.clone());
        Ok(())
    }

    async fn list_tags(&self, user_id: Uuid) -> DatabaseResult<Vec<Tag>> {
        self.check()?;
        Ok(self
            .tags
            .lock()
            .unwrap()
            .iter()
            .filter(|tag| tag.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn remove_tag(&self, user_id: Uuid, tag_id: Uuid) -> DatabaseResult<bool> {
        self.check()?;
        let mut tags = self.tags.lock().unwrap();
        let before = tags.len();
        tags.retain(|tag| !(tag.user_id == user_id && tag.id == tag_id));
        Ok(tags.len() < before)
    }

    async fn ping(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}

/// Publisher that records every event instead of sending it
#[derive(Default)]
pub struct RecordingPublisher {
    pub ankets: Mutex<Vec<AnketEvent>>,
    pub tags: Mutex<Vec<TagsEvent>>,
    pub photos: Mutex<Vec<PhotoEvent>>,
    failing: AtomicBool,
}

impl RecordingPublisher {
    /// Make every publish time out
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, queue: &str) -> Result<(), MessagingError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MessagingError::Timeout {
                queue: queue.to_string(),
                timeout_ms: 5_000,
            });
        }
        Ok(())
    }

    pub fn ankets(&self) -> Vec<AnketEvent> {
        self.ankets.lock().unwrap().clone()
    }

    pub fn tags(&self) -> Vec<TagsEvent> {
        self.tags.lock().unwrap().clone()
    }

    pub fn photos(&self) -> Vec<PhotoEvent> {
        self.photos.lock().unwrap().clone()
    }

    pub fn total(&self) -> usize {
        self.ankets().len() + self.tags().len() + self.photos().len()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish_anket(&self, event: &AnketEvent) -> Result<(), MessagingError> {
        self.check("ankets")?;
        self.ankets.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn publish_tags(&self, event: &TagsEvent) -> Result<(), MessagingError> {
        self.check("tags")?;
        self.tags.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn publish_photo(&self, event: &PhotoEvent) -> Result<(), MessagingError> {
        self.check("photos")?;
        self.photos.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Object storage kept in a map, with deterministic "signed" URLs
#[derive(Default)]
pub struct MemoryPhotoStorage {
    pub objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
    failing: AtomicBool,
}

impl MemoryPhotoStorage {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl PhotoStorage for MemoryPhotoStorage {
    async fn upload(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("bucket unreachable");
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content_type.to_string(), body));
        Ok(())
    }

    async fn access_url(&self, reference: &str) -> Result<String> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(reference.to_string());
        }
        Ok(format!("http://storage.test/photos/{reference}?signature=test"))
    }
}

/// Service wired to fresh in-memory collaborators
pub struct Fixture {
    pub service: ProfileService,
    pub store: Arc<InMemoryStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub storage: Arc<MemoryPhotoStorage>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_defaults(AnketDefaults::default())
    }

    pub fn with_defaults(defaults: AnketDefaults) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let storage = Arc::new(MemoryPhotoStorage::default());
        let service = ProfileService::new(
            store.clone(),
            publisher.clone(),
            storage.clone(),
            PHOTO_PREFIX,
        )
        .with_defaults(defaults);

        Self {
            service,
            store,
            publisher,
            storage,
        }
    }

    /// Seed a user directly in the store, bypassing events
    pub fn seed_user(&self, gender: Option<Gender>, birth_date: Option<NaiveDate>) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            bio: None,
            gender,
            birth_date,
            personality_type: None,
            personality_last_attempt: None,
            primary_photo: None,
            created_at: Utc::now(),
        };
        self.store.insert_user(user.clone());
        user
    }

    /// Seed photos for a user, in list order
    pub fn seed_photos(&self, user_id: Uuid, count: usize) -> Vec<Photo> {
        (0..count)
            .map(|_| {
                let id = Uuid::new_v4();
                let photo = Photo {
                    id,
                    user_id,
                    url: format!("{PHOTO_PREFIX}/{id}.jpg"),
                };
                self.store.insert_photo(photo.clone());
                photo
            })
            .collect()
    }

    pub fn set_primary(&self, user_id: Uuid, reference: &str) {
        let mut user = self.store.user(user_id).unwrap();
        user.primary_photo = Some(reference.to_string());
        self.store.insert_user(user);
    }
}
