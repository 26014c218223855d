//! Choice of the next primary photo when a photo is removed

use crate::models::Photo;

/// Outcome of removing a photo for the user's primary-photo reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryPhotoDecision {
    /// The current primary photo survives the removal and is re-announced
    KeepCurrent(String),
    /// This photo becomes the new primary photo
    Replace(Photo),
    /// Nothing is left to promote; the reference is cleared
    NoReplacement,
}

/// Whether a stored primary-photo reference points at `photo`
pub fn refers_to(reference: &str, photo: &Photo) -> bool {
    reference == photo.url || reference.contains(&photo.id.to_string())
}

/// Decide what happens to the primary photo when `removed` is deleted.
///
/// `photos` is the user's photo list before the removal. A replacement is
/// the first listed photo other than `removed`.
pub fn decide_primary_photo(
    current: Option<&str>,
    removed: &Photo,
    photos: &[Photo],
) -> PrimaryPhotoDecision {
    if let Some(current) = current {
        if !refers_to(current, removed) {
            return PrimaryPhotoDecision::KeepCurrent(current.to_string());
        }
    }

    photos
        .iter()
        .find(|photo| photo.id != removed.id)
        .cloned()
        .map(PrimaryPhotoDecision::Replace)
        .unwrap_or(PrimaryPhotoDecision::NoReplacement)
}
