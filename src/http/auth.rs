use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Bearer-token guard for admin routes. Without a configured key every request is rejected.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.http.admin_api_key.as_deref() else {
        tracing::warn!(path = %request.uri().path(), "Admin request rejected: no admin key configured");
        return Err(ApiError::Unauthorized);
    };

    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if provided == Some(expected) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(path = %request.uri().path(), "Admin request rejected: bad credentials");
        Err(ApiError::Unauthorized)
    }
}
