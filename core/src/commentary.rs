//! Coaching commentary: the structured summary, the prompt built from it, and
//! the result type that always has something to show.

use std::fmt::{self, Write};

use serde::Serialize;
use tracing::warn;

use crate::aggregation::{self, EffectiveProfile};
use crate::models::{ChartPoint, DailyCalories, Meal, Profile, WeightLog};

pub const RECENT_WEIGHT_LOGS: u32 = 7;
pub const RECENT_CALORIE_DAYS: usize = 3;
pub const MAX_REPLY_CHARS: usize = 150;

pub const FALLBACK_TEXT: &str =
    "Couldn't get coaching feedback right now. Please try again in a little while.";
pub const UNCONFIGURED_TEXT: &str = "Set GEMINI_API_KEY to enable coaching feedback.";

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackSummary {
    pub current_weight: f64,
    pub target_weight: f64,
    pub estimated_distance: i64,
    pub target_distance: i64,
    /// Newest first.
    pub recent_weights: Vec<ChartPoint>,
    /// Newest first.
    pub recent_calories: Vec<DailyCalories>,
}

impl FeedbackSummary {
    /// `weights_desc` must be newest first; only the first seven are used.
    #[must_use]
    pub fn assemble(profile: &Profile, weights_desc: &[WeightLog], meals: &[Meal]) -> Self {
        let effective = EffectiveProfile::resolve(profile);
        let current_weight = effective.current_weight(aggregation::latest_weight(weights_desc));

        let mut recent_weights: Vec<ChartPoint> = weights_desc
            .iter()
            .map(|log| ChartPoint {
                date: log.date,
                weight_kg: log.weight_kg,
            })
            .collect();
        recent_weights.sort_by(|a, b| b.date.cmp(&a.date));
        recent_weights.truncate(usize::try_from(RECENT_WEIGHT_LOGS).unwrap_or(usize::MAX));

        let mut recent_calories = aggregation::daily_calorie_series(meals);
        recent_calories.truncate(RECENT_CALORIE_DAYS);

        Self {
            current_weight,
            target_weight: effective.target_weight,
            estimated_distance: effective.estimated_distance(current_weight),
            target_distance: effective.target_distance,
            recent_weights,
            recent_calories,
        }
    }
}

/// Renders the prompt. Same summary in, same text out.
#[must_use]
pub fn build_prompt(summary: &FeedbackSummary) -> String {
    let mut weights = String::new();
    for point in &summary.recent_weights {
        let _ = writeln!(weights, "{}: {}kg", point.date, point.weight_kg);
    }
    if weights.is_empty() {
        weights.push_str("no data\n");
    }

    let mut calories = String::new();
    for day in &summary.recent_calories {
        let _ = writeln!(calories, "{}: {}kcal", day.date, day.calories);
    }
    if calories.is_empty() {
        calories.push_str("no data\n");
    }

    format!(
        "You are a fitness and golf coach. Support a golfer who is gaining weight to hit longer drives.

Profile:
- Current weight: {current}kg
- Target weight: {target}kg
- Estimated driving distance: {estimated}yd
- Target driving distance: {target_distance}yd

Weight over the last {weight_days} logs:
{weights}
Recent calorie intake:
{calories}
Reply briefly in English, within {max} characters:
1. An assessment of the weight-gain pace
2. One suggestion to improve meals
3. Golf motivation, with a forecast for reaching {target_distance}yd",
        current = summary.current_weight,
        target = summary.target_weight,
        estimated = summary.estimated_distance,
        target_distance = summary.target_distance,
        weight_days = RECENT_WEIGHT_LOGS,
        max = MAX_REPLY_CHARS,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentarySource {
    Generated,
    Fallback,
    Unconfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commentary {
    pub text: String,
    pub source: CommentarySource,
}

impl Commentary {
    /// Folds a generator outcome into something displayable. Errors and blank
    /// replies become the fallback text.
    pub fn from_result<E: fmt::Display>(result: Result<String, E>) -> Self {
        match result {
            Ok(text) if !text.trim().is_empty() => Self {
                text: text.trim().to_string(),
                source: CommentarySource::Generated,
            },
            Ok(_) => {
                warn!("Commentary generator returned an empty reply, using fallback");
                Self::fallback()
            }
            Err(e) => {
                warn!(error = %e, "Commentary generation failed, using fallback");
                Self::fallback()
            }
        }
    }

    #[must_use]
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            source: CommentarySource::Fallback,
        }
    }

    #[must_use]
    pub fn unconfigured() -> Self {
        Self {
            text: UNCONFIGURED_TEXT.to_string(),
            source: CommentarySource::Unconfigured,
        }
    }
}
