use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationError;

pub const DEFAULT_TARGET_DISTANCE_YD: i64 = 300;
pub const DEFAULT_TARGET_CALORIES: i64 = 3000;
pub const DEFAULT_KG_TO_YD_RATIO: f64 = 4.0;

/// Owner of every persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub start_weight: Option<f64>,
    pub target_weight: Option<f64>,
    pub start_distance: Option<i64>,
    pub target_distance: i64,
    pub target_calories: i64,
    pub kg_to_yd_ratio: f64,
    pub start_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    /// Setup is complete once both start and target weight are recorded.
    #[must_use]
    pub fn is_setup_complete(&self) -> bool {
        self.start_weight.is_some() && self.target_weight.is_some()
    }
}

/// Values collected by the one-time setup flow.
#[derive(Debug, Clone, Deserialize)]
pub struct SetupRequest {
    pub start_weight: f64,
    pub target_weight: f64,
    pub start_distance: i64,
    #[serde(default = "default_target_distance")]
    pub target_distance: i64,
    #[serde(default = "default_target_calories")]
    pub target_calories: i64,
    #[serde(default = "default_ratio")]
    pub kg_to_yd_ratio: f64,
}

fn default_target_distance() -> i64 {
    DEFAULT_TARGET_DISTANCE_YD
}

fn default_target_calories() -> i64 {
    DEFAULT_TARGET_CALORIES
}

fn default_ratio() -> f64 {
    DEFAULT_KG_TO_YD_RATIO
}

/// Post-setup changes. Start values and the start date are deliberately not
/// representable here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    pub target_weight: Option<f64>,
    pub target_distance: Option<i64>,
    pub target_calories: Option<i64>,
    pub kg_to_yd_ratio: Option<f64>,
}

impl SettingsUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target_weight.is_none()
            && self.target_distance.is_none()
            && self.target_calories.is_none()
            && self.kg_to_yd_ratio.is_none()
    }
}

// --- Weight ---

#[derive(Debug, Clone, Serialize)]
pub struct WeightLog {
    pub id: i64,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewWeightLog {
    pub date: NaiveDate,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightQuery {
    All,
    /// The most recent `n` logs.
    Recent(u32),
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

// --- Meals ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            _ => Err(ValidationError::InvalidMealType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Meal {
    pub id: i64,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub food_name: String,
    pub calories: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMeal {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub food_name: String,
    pub calories: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMeal {
    pub date: Option<NaiveDate>,
    pub meal_type: Option<MealType>,
    pub food_name: Option<String>,
    pub calories: Option<i64>,
}

impl UpdateMeal {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.meal_type.is_none()
            && self.food_name.is_none()
            && self.calories.is_none()
    }
}

// --- Food templates ---

#[derive(Debug, Clone, Serialize)]
pub struct FoodTemplate {
    pub id: i64,
    pub name: String,
    pub calories: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFoodTemplate {
    pub name: String,
    pub calories: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFoodTemplate {
    pub name: Option<String>,
    pub calories: Option<i64>,
}

// --- Derived view models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalorieStatus {
    Complete,
    OnTrack,
    Behind,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistanceCard {
    pub estimated_distance: i64,
    pub start_distance: i64,
    pub target_distance: i64,
    pub remaining_distance: i64,
    pub progress_percent: f64,
    pub distance_gained: i64,
    pub reached: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightCard {
    pub current_weight: f64,
    pub start_weight: f64,
    pub target_weight: f64,
    pub remaining_weight: f64,
    pub progress_percent: f64,
    pub weight_gained: f64,
    pub reached: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalorieCard {
    pub date: NaiveDate,
    pub consumed: i64,
    pub target: i64,
    pub progress_percent: i64,
    pub remaining: i64,
    pub status: CalorieStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartDomain {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    pub domain: Option<ChartDomain>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub distance: DistanceCard,
    pub weight: WeightCard,
    pub calories: CalorieCard,
    pub chart: ChartSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub meal_type: MealType,
    pub meals: Vec<Meal>,
    pub subtotal_calories: i64,
}

/// A day's meals split into the four fixed categories, in display order.
/// Categories without meals are present with an empty list.
#[derive(Debug, Clone, Serialize)]
pub struct MealsByCategory {
    pub groups: Vec<CategoryGroup>,
    pub total_calories: i64,
}

impl MealsByCategory {
    #[must_use]
    pub fn category(&self, meal_type: MealType) -> &[Meal] {
        self.groups
            .iter()
            .find(|g| g.meal_type == meal_type)
            .map_or(&[], |g| g.meals.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCalories {
    pub date: NaiveDate,
    pub calories: i64,
}
