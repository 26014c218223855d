//! Domain models and API payloads for the profile service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

pub mod events;

/// Gender as stored on the user record and carried in anket events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Result of the sixteen-type personality test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PersonalityType {
    Intj,
    Intp,
    Entj,
    Entp,
    Infj,
    Infp,
    Enfj,
    Enfp,
    Istj,
    Isfj,
    Estj,
    Esfj,
    Istp,
    Isfp,
    Estp,
    Esfp,
}

impl PersonalityType {
    pub const ALL: [PersonalityType; 16] = [
        PersonalityType::Intj,
        PersonalityType::Intp,
        PersonalityType::Entj,
        PersonalityType::Entp,
        PersonalityType::Infj,
        PersonalityType::Infp,
        PersonalityType::Enfj,
        PersonalityType::Enfp,
        PersonalityType::Istj,
        PersonalityType::Isfj,
        PersonalityType::Estj,
        PersonalityType::Esfj,
        PersonalityType::Istp,
        PersonalityType::Isfp,
        PersonalityType::Estp,
        PersonalityType::Esfp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityType::Intj => "INTJ",
            PersonalityType::Intp => "INTP",
            PersonalityType::Entj => "ENTJ",
            PersonalityType::Entp => "ENTP",
            PersonalityType::Infj => "INFJ",
            PersonalityType::Infp => "INFP",
            PersonalityType::Enfj => "ENFJ",
            PersonalityType::Enfp => "ENFP",
            PersonalityType::Istj => "ISTJ",
            PersonalityType::Isfj => "ISFJ",
            PersonalityType::Estj => "ESTJ",
            PersonalityType::Esfj => "ESFJ",
            PersonalityType::Istp => "ISTP",
            PersonalityType::Isfp => "ISFP",
            PersonalityType::Estp => "ESTP",
            PersonalityType::Esfp => "ESFP",
        }
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonalityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonalityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("invalid personality type: {s}"))
    }
}

/// User entity. Bio and personality fields keep the wire names existing
/// clients read (`about_myself`, `jung_result`, `jung_last_attempt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    #[serde(
        default,
        rename = "about_myself",
        alias = "bio",
        skip_serializing_if = "Option::is_none"
    )]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(
        default,
        rename = "jung_result",
        alias = "personality_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub personality_type: Option<PersonalityType>,
    #[serde(
        default,
        rename = "jung_last_attempt",
        alias = "personality_last_attempt",
        skip_serializing_if = "Option::is_none"
    )]
    pub personality_last_attempt: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Photo owned by a user. `url` is the object key or an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
}

/// Free-form tag owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub value: String,
}

/// User together with its photos and tags
#[derive(Debug, Clone, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub photos: Vec<Photo>,
    pub tags: Vec<Tag>,
}

/// Validated set of column changes persisted in a single update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    /// `Some(None)` clears the bio
    pub bio: Option<Option<String>>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub personality: Option<(PersonalityType, DateTime<Utc>)>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.bio.is_none()
            && self.gender.is_none()
            && self.birth_date.is_none()
            && self.personality.is_none()
    }
}

/// Request for user creation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default, alias = "about_myself")]
    pub bio: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default, alias = "about_myself")]
    pub bio: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "deserialize_birth_date")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, alias = "jung_result")]
    pub personality_type: Option<String>,
}

/// Request body for `PUT /users/:id/tag`
#[derive(Debug, Clone, Deserialize)]
pub struct AddTagRequest {
    #[serde(default)]
    pub tag: String,
}

/// Request body for `PATCH /users/:id/primary_photo`
#[derive(Debug, Clone, Deserialize)]
pub struct SetPrimaryPhotoRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
}

/// Request body for `PATCH /users/:id/about`
#[derive(Debug, Clone, Deserialize)]
pub struct AboutUpdateRequest {
    #[serde(default, alias = "bio")]
    pub about_myself: String,
}

/// Request body for `PATCH /users/:id/name`
#[derive(Debug, Clone, Deserialize)]
pub struct NameUpdateRequest {
    #[serde(default)]
    pub name: String,
}

/// Request body for `PATCH /users/:id/surname`
#[derive(Debug, Clone, Deserialize)]
pub struct SurnameUpdateRequest {
    #[serde(default)]
    pub surname: String,
}

/// Accepts `YYYY-MM-DD` as well as RFC 3339 timestamps sent by older clients.
fn deserialize_birth_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }

    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| Some(ts.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid birth_date: {raw}")))
}
