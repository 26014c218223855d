//! Event payloads published to the downstream queues

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Gender, Tag};

/// Date format used for `birth_date` in anket events
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Demographic snapshot sent to the ankets queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnketEvent {
    pub user_id: Uuid,
    pub gender: Gender,
    pub birth_date: String,
}

impl AnketEvent {
    pub fn new(user_id: Uuid, gender: Gender, birth_date: NaiveDate) -> Self {
        Self {
            user_id,
            gender,
            birth_date: birth_date.format(BIRTH_DATE_FORMAT).to_string(),
        }
    }
}

/// Full tag set of a user, flattened into one string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsEvent {
    #[serde(rename = "UserID")]
    pub user_id: Uuid,
    #[serde(rename = "Tags")]
    pub tags: String,
}

impl TagsEvent {
    pub fn from_tags(user_id: Uuid, tags: &[Tag]) -> Self {
        Self {
            user_id,
            tags: join_tag_values(tags),
        }
    }
}

/// Primary photo announcement sent to the photos queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoEvent {
    pub user_id: Uuid,
    #[serde(rename = "image_url")]
    pub path: String,
}

impl PhotoEvent {
    pub fn new(user_id: Uuid, path: impl Into<String>) -> Self {
        Self {
            user_id,
            path: path.into(),
        }
    }
}

/// Join tag values with single spaces, skipping blank values.
pub fn join_tag_values(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| tag.value.as_str())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
