use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use presentser_core::visits::{VisitLog, VisitStats};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, serde::Deserialize)]
pub struct TrackBody {
    #[serde(default)]
    pub vid: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// POST /api/track — count a page view from an anonymous visitor id.
pub async fn track(
    State(app): State<AppState>,
    Json(body): Json<TrackBody>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Some(vid) = body.vid.filter(|v| !v.is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "status": "no-vid" })),
        ));
    };
    let page = body.path.unwrap_or_default();

    let path = app.visits_path();
    let _guard = app.write_lock.lock().await;
    tokio::task::spawn_blocking(move || {
        let mut log = VisitLog::load(&path)?;
        log.track(&vid, &page, Utc::now());
        log.save(&path)
    })
    .await
    .map_err(AppError::join)??;

    Ok((StatusCode::OK, Json(serde_json::json!({ "ok": true }))))
}

/// GET /api/stats — unique visitors and total hits. Admin only.
pub async fn stats(State(app): State<AppState>) -> Result<Json<VisitStats>, AppError> {
    let path = app.visits_path();
    let stats = tokio::task::spawn_blocking(move || VisitLog::load(&path).map(|l| l.stats()))
        .await
        .map_err(AppError::join)??;
    Ok(Json(stats))
}
