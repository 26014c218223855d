//! Profile service routes

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Redirect},
    routing::{delete, get, patch, post, put},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::log_requests,
    models::{
        AboutUpdateRequest, AddTagRequest, CreateUserRequest, NameUpdateRequest,
        SetPrimaryPhotoRequest, SurnameUpdateRequest, UpdateProfileRequest,
    },
    state::AppState,
};

/// Multipart field carrying the uploaded image
const PHOTO_FIELD: &str = "photo";

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// User id plus a secondary id that is parsed by the handler, so each
/// identifier gets its own rejection message
#[derive(Debug, Deserialize)]
pub struct UserPhotoPath {
    pub id: Uuid,
    pub photo_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UserTagPath {
    pub id: Uuid,
    pub tag_id: String,
}

fn parse_id(raw: &str, message: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(message.to_string()))
}

/// Create the router for the profile service
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user).delete(delete_user))
        .route("/users/:id/profile", patch(update_profile))
        .route("/users/:id/about", patch(update_about))
        .route("/users/:id/name", patch(update_name))
        .route("/users/:id/surname", patch(update_surname))
        .route("/users/:id/photos", get(list_photos))
        .route(
            "/users/:id/addphoto",
            post(upload_photo).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/users/:id/photos/:photo_id", delete(remove_photo))
        .route("/users/:id/primary_photo", patch(set_primary_photo))
        .route("/users/:id/tag", put(add_tag))
        .route("/users/:id/tags", get(list_tags))
        .route("/users/:id/tags/:tag_id", delete(remove_tag))
        .route("/photos/:id", get(get_photo))
        .layer(middleware::from_fn(log_requests))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.profile_service.is_storage_healthy().await;
    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "profile-service",
            "database": database,
        })),
    )
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateUserRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let user = state.profile_service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user with its photos and tags
pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let details = state.profile_service.get_user(id).await?;
    Ok(Json(details))
}

pub async fn delete_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<StatusCode> {
    state.profile_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Partial profile update
pub async fn update_profile(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> ApiResult<StatusCode> {
    state.profile_service.update_profile(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deprecated: use `PATCH /users/:id/profile`
pub async fn update_about(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<AboutUpdateRequest>, ApiError>,
) -> ApiResult<StatusCode> {
    let request = UpdateProfileRequest {
        bio: Some(payload.about_myself),
        ..UpdateProfileRequest::default()
    };
    state.profile_service.update_profile(id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deprecated: use `PATCH /users/:id/profile`
pub async fn update_name(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<NameUpdateRequest>, ApiError>,
) -> ApiResult<StatusCode> {
    let request = UpdateProfileRequest {
        name: Some(payload.name),
        ..UpdateProfileRequest::default()
    };
    state.profile_service.update_profile(id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deprecated: use `PATCH /users/:id/profile`
pub async fn update_surname(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<SurnameUpdateRequest>, ApiError>,
) -> ApiResult<StatusCode> {
    let request = UpdateProfileRequest {
        surname: Some(payload.surname),
        ..UpdateProfileRequest::default()
    };
    state.profile_service.update_profile(id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_photos(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let photos = state.profile_service.list_photos(id).await?;
    Ok(Json(photos))
}

/// Upload a jpeg/png image sent as the `photo` multipart field
pub async fn upload_photo(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(mut multipart, _): WithRejection<Multipart, ApiError>,
) -> ApiResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read photo: {e}")))?;

        let photo = state
            .profile_service
            .upload_photo(id, &content_type, data.to_vec())
            .await?;

        return Ok((StatusCode::CREATED, Json(photo)));
    }

    Err(ApiError::BadRequest("Photo is required".to_string()))
}

pub async fn remove_photo(
    State(state): State<AppState>,
    WithRejection(Path(path), _): WithRejection<Path<UserPhotoPath>, ApiError>,
) -> ApiResult<StatusCode> {
    let photo_id = parse_id(&path.photo_id, "Invalid photo ID")?;
    state.profile_service.remove_photo(path.id, photo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_primary_photo(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<SetPrimaryPhotoRequest>, ApiError>,
) -> ApiResult<StatusCode> {
    let photo_id = payload
        .id
        .ok_or_else(|| ApiError::BadRequest("Photo ID is required".to_string()))?;

    state.profile_service.set_primary_photo(id, photo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_tag(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(payload), _): WithRejection<Json<AddTagRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let tag = state.profile_service.add_tag(id, &payload.tag).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn list_tags(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let tags = state.profile_service.list_tags(id).await?;
    Ok(Json(tags))
}

pub async fn remove_tag(
    State(state): State<AppState>,
    WithRejection(Path(path), _): WithRejection<Path<UserTagPath>, ApiError>,
) -> ApiResult<StatusCode> {
    let tag_id = parse_id(&path.tag_id, "Invalid tag ID")?;
    state.profile_service.remove_tag(path.id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Redirect to a short-lived URL for the photo
pub async fn get_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> ApiResult<Redirect> {
    let photo_id = parse_id(&photo_id, "Invalid photo ID")?;
    let url = state.profile_service.photo_access_url(photo_id).await?;
    Ok(Redirect::temporary(&url))
}
