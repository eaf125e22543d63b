use axum::Json;
use presentser_core::error::PresentserError;
use presentser_core::input;
use presentser_core::projection::{self, ProjectionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Untyped attendance form. Every field may arrive as a number or a string.
#[derive(Debug, Default, Deserialize)]
pub struct AttendanceBody {
    #[serde(default)]
    pub present: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub target: Option<Value>,
    #[serde(default)]
    pub gender: Option<Value>,
    #[serde(default)]
    pub username: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CalcResponse {
    pub ok: bool,
    pub present: f64,
    pub total: f64,
    #[serde(flatten)]
    pub result: ProjectionResult,
}

/// POST /api/calc — run the projection without saving anything.
pub async fn calc(Json(body): Json<AttendanceBody>) -> Result<Json<CalcResponse>, AppError> {
    let attendance = input::attendance(body.present.as_ref(), body.total.as_ref())?;
    let target_pct = input::target_spec(body.target.as_ref(), body.gender.as_ref()).resolve()?;
    if attendance.total <= 0.0 {
        return Err(PresentserError::NoClassesHeld.into());
    }

    let result = projection::project(attendance, target_pct, &mut rand::thread_rng());
    tracing::debug!(
        present = attendance.present,
        total = attendance.total,
        target_pct,
        "calc"
    );

    Ok(Json(CalcResponse {
        ok: true,
        present: attendance.present,
        total: attendance.total,
        result,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Json<AttendanceBody> {
        Json(serde_json::from_value(v).unwrap())
    }

    #[tokio::test]
    async fn calc_resolves_category_target() {
        let resp = calc(body(json!({"present": "20", "total": "40", "gender": "female"})))
            .await
            .unwrap()
            .0;
        assert_eq!(resp.result.target_pct, 73.0);
        assert_eq!(resp.result.current_pct, 50.0);
        assert!(resp.ok);
    }

    #[tokio::test]
    async fn calc_rejects_zero_total() {
        let err = calc(body(json!({"present": 0, "total": 0}))).await.unwrap_err();
        assert!(matches!(
            err.0.downcast_ref::<PresentserError>(),
            Some(PresentserError::NoClassesHeld)
        ));
    }

    #[tokio::test]
    async fn calc_rejects_bad_target() {
        let err = calc(body(json!({"present": 1, "total": 2, "target": "lots"})))
            .await
            .unwrap_err();
        assert!(matches!(
            err.0.downcast_ref::<PresentserError>(),
            Some(PresentserError::InvalidTarget(_))
        ));
    }
}
