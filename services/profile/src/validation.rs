//! Input validation utilities

use crate::models::PersonalityType;

/// Longest tag value the `user_tags` table accepts
pub const MAX_TAG_LENGTH: usize = 100;

/// Validate a required name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    Ok(())
}

/// Validate a required surname
pub fn validate_surname(surname: &str) -> Result<(), String> {
    if surname.is_empty() {
        return Err("Surname cannot be empty".to_string());
    }

    Ok(())
}

/// Parse a personality test result
pub fn validate_personality_type(code: &str) -> Result<PersonalityType, String> {
    code.parse()
        .map_err(|_| format!("Invalid personality type: {code}"))
}

/// Validate a tag value
pub fn validate_tag(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("Tag cannot be empty".to_string());
    }

    if value.chars().count() > MAX_TAG_LENGTH {
        return Err(format!(
            "Tag must be at most {MAX_TAG_LENGTH} characters long"
        ));
    }

    Ok(())
}

/// Validate a photo reference
pub fn validate_photo_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("Photo URL cannot be empty".to_string());
    }

    Ok(())
}

/// Check an upload content type; returns the file extension to store under
pub fn validate_image_content_type(content_type: &str) -> Result<&'static str, String> {
    match content_type {
        "image/jpeg" | "image/jpg" => Ok("jpg"),
        "image/png" => Ok("png"),
        _ => Err("Only jpeg/png images are allowed".to_string()),
    }
}
