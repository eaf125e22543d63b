use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use presentser_core::error::PresentserError;

use crate::error::AppError;
use crate::state::AppState;

/// Axum middleware guarding admin routes with the shared admin key.
///
/// The key may be given as `?key=...` or in an `x-admin-key` header. When no
/// key is configured every request passes through.
pub async fn admin_middleware(State(app): State<AppState>, req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get("x-admin-key")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            req.uri()
                .query()
                .and_then(extract_key_param)
                .map(str::to_string)
        });

    if app.admin.allows(presented.as_deref()) {
        return next.run(req).await;
    }

    tracing::warn!(path = %req.uri().path(), "admin request rejected");
    AppError(PresentserError::Forbidden.into()).into_response()
}

fn extract_key_param(query: &str) -> Option<&str> {
    query.split('&').find_map(|kv| kv.strip_prefix("key="))
}
