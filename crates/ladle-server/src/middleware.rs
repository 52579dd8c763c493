use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use ladle_auth::AuthState;

// =============================================================================
// Authentication Middleware
// =============================================================================

/// Authentication middleware guarding mutating recipe routes.
///
/// This middleware:
/// 1. Skips requests that do not require authentication (reads, auth and
///    health endpoints)
/// 2. Validates the `Authorization` token
/// 3. Stores the [`ladle_auth::AuthSubject`] in request extensions for
///    downstream use
///
/// A rejected request never reaches the handlers, so no store or cache side
/// effect can occur without a valid token.
pub async fn authentication_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if !requires_authentication(&req) {
        return next.run(req).await;
    }

    let header = match req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            tracing::debug!(path = %req.uri().path(), "no Authorization header");
            return unauthorized_response("authentication required");
        }
    };

    match state.authenticate(header) {
        Ok(subject) => {
            tracing::debug!(subject = %subject.username(), "token validated");
            req.extensions_mut().insert(subject);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "token validation failed");
            unauthorized_response(&e.to_string())
        }
    }
}

/// Only mutating methods on recipe routes are gated; reads, `/signin`,
/// `/refresh`, and the health endpoints stay public.
fn requires_authentication(req: &Request<Body>) -> bool {
    let method = req.method();
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        return false;
    }
    req.uri().path().starts_with("/recipes")
}

fn unauthorized_response(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

// =============================================================================
// Other Middleware
// =============================================================================

// Middleware that ensures each request has an X-Request-Id and mirrors it on the response
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let header_name = HeaderName::from_static("x-request-id");

    // If the incoming request already has a request-id, preserve it; otherwise generate one
    let req_id_value = req
        .headers()
        .get(&header_name)
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    // Add to request extensions for downstream usage (e.g., logging)
    req.extensions_mut().insert(req_id_value.clone());

    let mut res = next.run(req).await;

    // Add/propagate the request id header to response
    res.headers_mut().insert(header_name, req_id_value);

    res
}
