//! Attendance projection engine.
//!
//! Pure functions over `present` / `total` class counts and a target
//! fraction. Nothing here touches the filesystem or shared state, so every
//! function is safe to call from any thread.

use crate::error::{PresentserError, Result};
use crate::quip;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Target defaults
// ---------------------------------------------------------------------------

/// Target used when neither an explicit value nor a known category is given.
pub const GLOBAL_DEFAULT_TARGET: f64 = 75.0;

/// Per-category default targets, in percent.
pub const CATEGORY_DEFAULTS: &[(&str, f64)] = &[("male", 75.0), ("female", 73.0)];

/// Look up a category's default target. Matching ignores case and
/// surrounding whitespace.
pub fn category_default(category: &str) -> Option<f64> {
    let key = category.trim().to_lowercase();
    CATEGORY_DEFAULTS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, pct)| *pct)
}

// ---------------------------------------------------------------------------
// Inputs and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttendanceInput {
    pub present: f64,
    pub total: f64,
}

impl AttendanceInput {
    pub fn new(present: f64, total: f64) -> Self {
        Self { present, total }
    }

    /// Unrounded attendance ratio, or `None` when no classes were held.
    pub fn ratio(&self) -> Option<f64> {
        if self.total <= 0.0 {
            None
        } else {
            Some(self.present / self.total)
        }
    }

    /// Unrounded attendance percentage; 0 when no classes were held.
    pub fn current_pct(&self) -> f64 {
        self.ratio().map(|r| r * 100.0).unwrap_or(0.0)
    }
}

/// How the caller asked for a target: an explicit percentage as typed, a
/// category key, or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TargetSpec {
    pub fn resolve(&self) -> Result<f64> {
        resolve_target(self.explicit.as_deref(), self.category.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Rounded to two decimals for display.
    pub current_pct: f64,
    pub target_pct: f64,
    /// `None` when no finite number of attended classes reaches the target.
    pub required_future_days: Option<u64>,
    pub bunkable_days: u64,
    pub quip: String,
}

// ---------------------------------------------------------------------------
// Target resolution
// ---------------------------------------------------------------------------

/// Resolve the effective target percentage.
///
/// A non-blank `explicit` value wins and is returned verbatim, without
/// clamping. Otherwise the category table is consulted, then the global
/// default. An explicit value that does not parse is an error rather than a
/// silent fallback.
pub fn resolve_target(explicit: Option<&str>, category: Option<&str>) -> Result<f64> {
    if let Some(raw) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return match raw.parse::<f64>() {
            Ok(pct) if pct.is_finite() => Ok(pct),
            _ => Err(PresentserError::InvalidTarget(raw.to_string())),
        };
    }
    Ok(category
        .and_then(category_default)
        .unwrap_or(GLOBAL_DEFAULT_TARGET))
}

// ---------------------------------------------------------------------------
// Day counts
// ---------------------------------------------------------------------------

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
}

/// Smallest number of consecutive attended classes after which
/// `(present + x) / (total + x) >= target_fraction`.
///
/// Returns `None` when the ratio has no basis (`total <= 0`) or when the
/// target cannot be reached by attending alone (a target of 100% or more
/// with any existing absence).
pub fn required_future_days(present: f64, total: f64, target_fraction: f64) -> Option<u64> {
    if !(present.is_finite() && total.is_finite() && target_fraction.is_finite()) {
        return None;
    }
    if total <= 0.0 {
        return None;
    }
    if present / total >= target_fraction {
        return Some(0);
    }
    // An existing absence can never be erased, so a full-attendance target
    // is only reachable when there is none.
    if (approx_eq(target_fraction, 1.0) || target_fraction > 1.0) && !approx_eq(present, total)
    {
        return None;
    }
    let denom = 1.0 - target_fraction;
    if denom == 0.0 {
        return None;
    }
    let x = (target_fraction * total - present) / denom;
    if x <= 0.0 {
        return Some(0);
    }

    // The closed form can land one day off when the target has no exact
    // binary representation; settle against the inequality itself.
    let attends = |days: f64| (present + days) / (total + days) >= target_fraction;
    let mut days = x.ceil();
    if days > 1.0 && attends(days - 1.0) {
        days -= 1.0;
    } else if !attends(days) {
        days += 1.0;
    }
    Some(days as u64)
}

/// Largest number of consecutive skipped classes after which
/// `present / (total + x) >= target_fraction` still holds.
pub fn max_bunkable_days(present: f64, total: f64, target_fraction: f64) -> u64 {
    if !(present.is_finite() && total.is_finite() && target_fraction.is_finite()) {
        return 0;
    }
    if total < 0.0 || target_fraction <= 0.0 || total == 0.0 {
        return 0;
    }
    if present / total < target_fraction {
        return 0;
    }
    let max_x = present / target_fraction - total;
    if max_x <= 0.0 {
        return 0;
    }

    let holds = |days: f64| present / (total + days) >= target_fraction;
    let mut days = max_x.floor();
    if holds(days + 1.0) {
        days += 1.0;
    } else if days > 0.0 && !holds(days) {
        days -= 1.0;
    }
    days as u64
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run the full projection for one input against `target_pct` (a
/// percentage, not a fraction).
pub fn project<R: Rng + ?Sized>(
    input: AttendanceInput,
    target_pct: f64,
    rng: &mut R,
) -> ProjectionResult {
    let fraction = target_pct / 100.0;
    let current_pct = input.current_pct();
    ProjectionResult {
        current_pct: round2(current_pct),
        target_pct,
        required_future_days: required_future_days(input.present, input.total, fraction),
        bunkable_days: max_bunkable_days(input.present, input.total, fraction),
        quip: quip::pick_quip(current_pct, rng).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
