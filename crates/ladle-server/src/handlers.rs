use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use ladle_auth::{AuthError, AuthSubject, IssuedToken};
use ladle_core::{Recipe, RecipeDraft};
use ladle_storage::StorageError;

use crate::server::AppState;

// ---- Error mapping ----

/// A typed failure mapped to a response status at the transport edge.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "recipe not found")
            }
            StorageError::InvalidRecord { message } => {
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            StorageError::ConnectionError { message } => {
                tracing::error!(error = %message, "store unavailable");
                Self::new(StatusCode::BAD_GATEWAY, "store unavailable")
            }
            StorageError::Internal { message } => {
                tracing::error!(error = %message, "internal storage error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed
            | AuthError::InvalidToken { .. }
            | AuthError::Unauthorized { .. }
            | AuthError::RefreshNotEligible => Self::unauthorized(err.to_string()),
            AuthError::RefreshTooEarly => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            AuthError::Storage { .. } | AuthError::Configuration { .. } | AuthError::Internal { .. } => {
                tracing::error!(error = %err, "internal auth error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

// ---- Service endpoints ----

pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "service": "Ladle Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.recipes.backend_name(),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

pub async fn metrics() -> Response {
    match crate::metrics::render_metrics() {
        Some(rendered) => rendered.into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics not initialized").into_response(),
    }
}

// ---- Recipes ----

pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(state.recipes.list().await?))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    state
        .recipes
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "recipe not found"))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Tag to match, case-insensitive. An absent tag matches nothing,
    /// mirroring the original behavior.
    #[serde(default)]
    pub tag: String,
}

pub async fn search_recipes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(state.recipes.search_by_tag(&query.tag).await?))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Json(draft): Json<RecipeDraft>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = state.recipes.create(draft).await?;
    tracing::debug!(subject = %subject.username(), id = %recipe.id, "recipe created via API");
    Ok(Json(recipe))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(subject): Extension<AuthSubject>,
    Json(draft): Json<RecipeDraft>,
) -> Result<Json<Value>, ApiError> {
    state.recipes.update(&id, draft).await?;
    tracing::debug!(subject = %subject.username(), id = %id, "recipe updated via API");
    Ok(Json(json!({ "message": "recipe updated" })))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(subject): Extension<AuthSubject>,
) -> Result<Json<Value>, ApiError> {
    state.recipes.delete(&id).await?;
    tracing::debug!(subject = %subject.username(), id = %id, "recipe deleted via API");
    Ok(Json(json!({ "message": "recipe deleted" })))
}

// ---- Auth ----

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    let issued = state.tokens.issue(&req.username, &req.password).await?;
    Ok(Json(issued))
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<IssuedToken>, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| ApiError::unauthorized("authentication required"))?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    let issued = state.tokens.refresh(token)?;
    Ok(Json(issued))
}
