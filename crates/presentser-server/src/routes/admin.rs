use axum::extract::State;
use axum::Json;
use presentser_core::record::{RecordRow, RecordStore};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/admin/records — every saved record, sorted by username.
pub async fn list_records(State(app): State<AppState>) -> Result<Json<Vec<RecordRow>>, AppError> {
    let path = app.records_path();
    let rows = tokio::task::spawn_blocking(move || RecordStore::load(&path).map(|s| s.rows()))
        .await
        .map_err(AppError::join)??;
    Ok(Json(rows))
}

/// GET /api/admin/export — the raw record store as persisted.
pub async fn export(State(app): State<AppState>) -> Result<Json<RecordStore>, AppError> {
    let path = app.records_path();
    let store = tokio::task::spawn_blocking(move || RecordStore::load(&path))
        .await
        .map_err(AppError::join)??;
    Ok(Json(store))
}
