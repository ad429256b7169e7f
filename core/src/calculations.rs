//! Progress estimation and target tracking.
//!
//! Every function is pure and total over finite inputs. Callers resolve absent
//! measurements through [`crate::aggregation::EffectiveProfile`] before calling
//! in here; nothing in this module sees an `Option`.
//!
//! Rounding uses [`f64::round`]: nearest integer, ties away from zero
//! (`262.5 -> 263`, `-0.5 -> -1`).

use crate::models::CalorieStatus;

pub use crate::models::{
    DEFAULT_KG_TO_YD_RATIO as DEFAULT_RATIO, DEFAULT_TARGET_DISTANCE_YD as DEFAULT_TARGET_DISTANCE,
};

const ON_TRACK_PERCENT: i64 = 80;

/// Driving distance in yards predicted from weight gained since the start.
/// Weight loss reduces the estimate; there is no floor.
#[must_use]
pub fn estimated_distance(
    start_weight: f64,
    current_weight: f64,
    start_distance: i64,
    ratio: f64,
) -> i64 {
    #[allow(clippy::cast_precision_loss)]
    let start = start_distance as f64;
    (start + (current_weight - start_weight) * ratio).round() as i64
}

#[must_use]
pub fn remaining_weight(current: f64, target: f64) -> f64 {
    (target - current).max(0.0)
}

#[must_use]
pub fn remaining_distance(estimated: i64, target: i64) -> i64 {
    (target - estimated).max(0)
}

/// Position of `current` between `start` and `target`, clamped to `[0, 100]`.
/// A zero-span target counts as already reached.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn progress_percent(start: f64, current: f64, target: f64) -> f64 {
    if target == start {
        return 100.0;
    }
    ((current - start) / (target - start) * 100.0).clamp(0.0, 100.0)
}

/// Share of the daily calorie target consumed. Not clamped: 2500 of 2000 is 125.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calorie_progress_percent(consumed: i64, target: i64) -> i64 {
    if target <= 0 {
        return 0;
    }
    (consumed as f64 / target as f64 * 100.0).round() as i64
}

#[must_use]
pub fn remaining_calories(consumed: i64, target: i64) -> i64 {
    (target - consumed).max(0)
}

#[must_use]
pub fn calorie_status(percent: i64) -> CalorieStatus {
    if percent >= 100 {
        CalorieStatus::Complete
    } else if percent >= ON_TRACK_PERCENT {
        CalorieStatus::OnTrack
    } else {
        CalorieStatus::Behind
    }
}

#[must_use]
pub fn weight_gained(start: f64, current: f64) -> f64 {
    current - start
}

#[must_use]
pub fn distance_gained(start: i64, estimated: i64) -> i64 {
    estimated - start
}
