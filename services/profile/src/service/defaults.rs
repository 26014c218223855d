//! Missing-data policy for anket events
//!
//! Downstream consumers always receive both gender and birth date. When one
//! of them is unknown the values below are announced instead.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Gender, User, events::AnketEvent};

/// Defaults applied when building anket events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnketDefaults {
    /// Announced whenever no gender is known
    pub gender: Gender,
    /// Announced on creation, before a birth date can be collected
    pub creation_birth_date: NaiveDate,
    /// Announced when only the gender changes and no birth date is stored
    pub missing_birth_date: NaiveDate,
}

impl Default for AnketDefaults {
    fn default() -> Self {
        Self {
            gender: Gender::Female,
            creation_birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            missing_birth_date: NaiveDate::default(),
        }
    }
}

impl AnketDefaults {
    pub fn gender_or_default(&self, gender: Option<Gender>) -> Gender {
        gender.unwrap_or(self.gender)
    }

    /// Anket announced right after a user is created
    pub fn for_new_user(&self, user_id: Uuid, gender: Option<Gender>) -> AnketEvent {
        AnketEvent::new(
            user_id,
            self.gender_or_default(gender),
            self.creation_birth_date,
        )
    }

    /// Anket announced after a profile update.
    ///
    /// `stored` is the user as persisted after the update. Returns `None`
    /// when the update touched neither gender nor birth date.
    pub fn for_update(
        &self,
        user_id: Uuid,
        gender: Option<Gender>,
        birth_date: Option<NaiveDate>,
        stored: &User,
    ) -> Option<AnketEvent> {
        match (gender, birth_date) {
            (Some(gender), Some(birth_date)) => Some(AnketEvent::new(user_id, gender, birth_date)),
            (None, Some(birth_date)) => Some(AnketEvent::new(
                user_id,
                self.gender_or_default(stored.gender),
                birth_date,
            )),
            (Some(gender), None) => Some(AnketEvent::new(
                user_id,
                gender,
                stored.birth_date.unwrap_or(self.missing_birth_date),
            )),
            (None, None) => None,
        }
    }
}
