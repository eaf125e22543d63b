use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use presentser_core::error::PresentserError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn join(err: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {err}"))
    }
}

fn status_for(err: &PresentserError) -> StatusCode {
    match err {
        PresentserError::InvalidTarget(_)
        | PresentserError::InvalidInput { .. }
        | PresentserError::NoClassesHeld => StatusCode::BAD_REQUEST,
        PresentserError::RecordNotFound(_) => StatusCode::NOT_FOUND,
        PresentserError::Forbidden => StatusCode::FORBIDDEN,
        PresentserError::Io(_) | PresentserError::Yaml(_) | PresentserError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<PresentserError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!("request failed: {:#}", self.0);
        }

        let body = serde_json::json!({ "ok": false, "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
