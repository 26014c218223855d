//! Application state shared across handlers

use crate::service::ProfileService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub profile_service: ProfileService,
}
