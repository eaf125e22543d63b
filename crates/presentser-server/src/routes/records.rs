use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use presentser_core::error::PresentserError;
use presentser_core::input;
use presentser_core::record::{RecordPatch, RecordStore, GUEST_KEY};
use presentser_core::recover;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::routes::calc::AttendanceBody;
use crate::state::AppState;

/// POST /api/save — store counts for a user (default `guest`).
///
/// Gender and target are only written when supplied; an unparseable target
/// is ignored rather than rejected.
pub async fn save(
    State(app): State<AppState>,
    Json(body): Json<AttendanceBody>,
) -> Result<Json<Value>, AppError> {
    let attendance = input::attendance(body.present.as_ref(), body.total.as_ref())?;
    let username = input::text(body.username.as_ref()).unwrap_or_else(|| GUEST_KEY.to_string());
    let patch = RecordPatch {
        present: Some(attendance.present),
        total: Some(attendance.total),
        target: input::target_text(body.target.as_ref())
            .and_then(|t| t.trim().parse::<f64>().ok())
            .filter(|t| t.is_finite() && *t != 0.0),
        gender: input::text(body.gender.as_ref()),
        username: None,
        first_name: None,
    };

    let path = app.records_path();
    let key = username.clone();
    let _guard = app.write_lock.lock().await;
    tokio::task::spawn_blocking(move || {
        let mut store = RecordStore::load(&path)?;
        store.apply_save(&key, patch, Utc::now());
        store.save(&path)
    })
    .await
    .map_err(AppError::join)??;

    tracing::info!(username = %username, "record saved");
    Ok(Json(serde_json::json!({ "ok": true, "username": username })))
}

#[derive(serde::Deserialize)]
pub struct StatusParams {
    pub username: Option<String>,
}

/// GET /api/status?username= — fetch a saved record.
pub async fn status(
    State(app): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<Value>, AppError> {
    let username = params
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| GUEST_KEY.to_string());

    let path = app.records_path();
    let record = tokio::task::spawn_blocking(move || {
        let store = RecordStore::load(&path)?;
        store
            .get(&username)
            .cloned()
            .ok_or(PresentserError::RecordNotFound(username))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({ "ok": true, "record": record })))
}

/// POST /api/autosave — replace the caller's record with the latest form
/// state.
///
/// The payload is logged verbatim so that records can be rebuilt from the
/// log with `presentser recover`.
pub async fn autosave(
    State(app): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    let patch = RecordPatch::from_payload(&payload);
    let key = patch.autosave_key();
    let logged = serde_json::Value::Object(payload);
    tracing::info!("{}", recover::autosave_log_line(&key, &logged));

    let path = app.records_path();
    let _guard = app.write_lock.lock().await;
    let written = tokio::task::spawn_blocking(move || {
        let mut store = RecordStore::load(&path)?;
        store.apply_autosave(&key, patch, Utc::now());
        store.save(&path)?;
        Ok::<_, PresentserError>(store.len())
    })
    .await
    .map_err(AppError::join)??;

    tracing::info!("autosave: wrote {written} records");
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
