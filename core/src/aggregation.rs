//! Turns persisted rows into the inputs and view models of the dashboard.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::calculations;
use crate::models::{
    CalorieCard, CategoryGroup, ChartDomain, ChartPoint, ChartSeries, DailyCalories, Dashboard,
    DistanceCard, Meal, MealType, MealsByCategory, Profile, WeightCard, WeightLog,
};

pub const DEFAULT_START_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_TARGET_WEIGHT_KG: f64 = 80.0;
pub const DEFAULT_START_DISTANCE_YD: i64 = 260;

/// Number of weight logs shown on the dashboard chart.
pub const CHART_WINDOW: u32 = 14;

const MIN_CHART_PAD: f64 = 2.0;

/// Profile values with every absent measurement replaced by its documented
/// default, so the calculation functions only ever see finite numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveProfile {
    pub start_weight: f64,
    pub target_weight: f64,
    pub start_distance: i64,
    pub target_distance: i64,
    pub target_calories: i64,
    pub ratio: f64,
}

impl EffectiveProfile {
    #[must_use]
    pub fn resolve(profile: &Profile) -> Self {
        let ratio = if profile.kg_to_yd_ratio.is_finite() {
            profile.kg_to_yd_ratio
        } else {
            calculations::DEFAULT_RATIO
        };
        Self {
            start_weight: finite_or(profile.start_weight, DEFAULT_START_WEIGHT_KG),
            target_weight: finite_or(profile.target_weight, DEFAULT_TARGET_WEIGHT_KG),
            start_distance: profile.start_distance.unwrap_or(DEFAULT_START_DISTANCE_YD),
            target_distance: profile.target_distance,
            target_calories: profile.target_calories,
            ratio,
        }
    }

    /// The latest logged weight, or the start weight when there is none.
    #[must_use]
    pub fn current_weight(&self, latest: Option<&WeightLog>) -> f64 {
        finite_or(latest.map(|log| log.weight_kg), self.start_weight)
    }

    #[must_use]
    pub fn estimated_distance(&self, current_weight: f64) -> i64 {
        calculations::estimated_distance(
            self.start_weight,
            current_weight,
            self.start_distance,
            self.ratio,
        )
    }
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

#[must_use]
pub fn daily_calorie_total(meals: &[Meal], date: NaiveDate) -> i64 {
    meals
        .iter()
        .filter(|m| m.date == date)
        .map(|m| m.calories)
        .sum()
}

#[must_use]
pub fn group_by_category(meals: &[Meal]) -> MealsByCategory {
    let groups: Vec<CategoryGroup> = MealType::ALL
        .iter()
        .map(|&meal_type| {
            let meals: Vec<Meal> = meals
                .iter()
                .filter(|m| m.meal_type == meal_type)
                .cloned()
                .collect();
            let subtotal_calories = meals.iter().map(|m| m.calories).sum();
            CategoryGroup {
                meal_type,
                meals,
                subtotal_calories,
            }
        })
        .collect();
    let total_calories = groups.iter().map(|g| g.subtotal_calories).sum();
    MealsByCategory {
        groups,
        total_calories,
    }
}

#[must_use]
pub fn latest_weight(logs: &[WeightLog]) -> Option<&WeightLog> {
    logs.iter().max_by_key(|log| log.date)
}

/// Per-day calorie totals, most recent day first.
#[must_use]
pub fn daily_calorie_series(meals: &[Meal]) -> Vec<DailyCalories> {
    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for meal in meals {
        *by_day.entry(meal.date).or_insert(0) += meal.calories;
    }
    by_day
        .into_iter()
        .rev()
        .map(|(date, calories)| DailyCalories { date, calories })
        .collect()
}

/// Builds the weight chart from a window of logs fetched newest first.
///
/// Points come out oldest first. The value domain spans every logged weight
/// plus the start and target weights when given, padded by 10% of the span
/// (2 kg when the span is zero) and widened to whole kilograms.
#[must_use]
pub fn chart_series(
    logs_desc: &[WeightLog],
    start_weight: Option<f64>,
    target_weight: Option<f64>,
) -> ChartSeries {
    let mut points: Vec<ChartPoint> = logs_desc
        .iter()
        .map(|log| ChartPoint {
            date: log.date,
            weight_kg: log.weight_kg,
        })
        .collect();
    points.sort_by_key(|p| p.date);

    let values = points
        .iter()
        .map(|p| p.weight_kg)
        .chain(start_weight)
        .chain(target_weight)
        .filter(|v| v.is_finite());

    let bounds = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    });

    let domain = bounds.map(|(min, max)| {
        let span = max - min;
        let pad = if span > 0.0 { span * 0.1 } else { MIN_CHART_PAD };
        ChartDomain {
            min: (min - pad).floor(),
            max: (max + pad).ceil(),
        }
    });

    ChartSeries { points, domain }
}

/// Assembles every dashboard card from one user's rows.
/// `logs_desc` should hold the chart window, newest first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_dashboard(
    profile: &Profile,
    logs_desc: &[WeightLog],
    meals_today: &[Meal],
    today: NaiveDate,
) -> Dashboard {
    let effective = EffectiveProfile::resolve(profile);
    let current_weight = effective.current_weight(latest_weight(logs_desc));
    let estimated = effective.estimated_distance(current_weight);

    let distance_progress = calculations::progress_percent(
        effective.start_distance as f64,
        estimated as f64,
        effective.target_distance as f64,
    );
    let distance = DistanceCard {
        estimated_distance: estimated,
        start_distance: effective.start_distance,
        target_distance: effective.target_distance,
        remaining_distance: calculations::remaining_distance(estimated, effective.target_distance),
        progress_percent: distance_progress,
        distance_gained: calculations::distance_gained(effective.start_distance, estimated),
        reached: estimated >= effective.target_distance,
    };

    let weight = WeightCard {
        current_weight,
        start_weight: effective.start_weight,
        target_weight: effective.target_weight,
        remaining_weight: calculations::remaining_weight(current_weight, effective.target_weight),
        progress_percent: calculations::progress_percent(
            effective.start_weight,
            current_weight,
            effective.target_weight,
        ),
        weight_gained: calculations::weight_gained(effective.start_weight, current_weight),
        reached: current_weight >= effective.target_weight,
    };

    let consumed = daily_calorie_total(meals_today, today);
    let calorie_percent = calculations::calorie_progress_percent(consumed, effective.target_calories);
    let calories = CalorieCard {
        date: today,
        consumed,
        target: effective.target_calories,
        progress_percent: calorie_percent,
        remaining: calculations::remaining_calories(consumed, effective.target_calories),
        status: calculations::calorie_status(calorie_percent),
    };

    let chart = chart_series(logs_desc, profile.start_weight, profile.target_weight);

    Dashboard {
        distance,
        weight,
        calories,
        chart,
    }
}
