//! Input rules checked before anything is written.

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::models::{
    NewFoodTemplate, NewMeal, Profile, SettingsUpdate, SetupRequest, UpdateFoodTemplate,
    UpdateMeal,
};

pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 30.0..=200.0;
pub const CALORIE_RANGE: RangeInclusive<i64> = 0..=5000;
pub const RATIO_RANGE: RangeInclusive<f64> = 3.0..=5.0;
pub const START_DISTANCE_RANGE_YD: RangeInclusive<i64> = 150..=350;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Weight must be between 30 and 200 kg (got {0})")]
    WeightOutOfRange(f64),
    #[error("Start weight must be between 30 and 200 kg (got {0})")]
    StartWeightOutOfRange(f64),
    #[error("Target weight must be between 30 and 200 kg (got {0})")]
    TargetWeightOutOfRange(f64),
    #[error("Target weight ({target} kg) must be greater than start weight ({start} kg)")]
    TargetNotAboveStart { start: f64, target: f64 },
    #[error("Start distance must be between 150 and 350 yd (got {0})")]
    StartDistanceOutOfRange(i64),
    #[error("Target distance must be greater than 0 yd (got {0})")]
    TargetDistanceNotPositive(i64),
    #[error("Target calories must be greater than 0 kcal (got {0})")]
    TargetCaloriesNotPositive(i64),
    #[error("Conversion ratio must be between 3 and 5 yd/kg (got {0})")]
    RatioOutOfRange(f64),
    #[error("Calories must be between 0 and 5000 kcal (got {0})")]
    CaloriesOutOfRange(i64),
    #[error("Food name must not be empty")]
    EmptyFoodName,
    #[error("Template name must not be empty")]
    EmptyTemplateName,
    #[error("Invalid meal type '{0}'. Must be one of: breakfast, lunch, dinner, snack")]
    InvalidMealType(String),
    #[error("Nothing to update")]
    NothingToUpdate,
}

pub type ValidationResult = Result<(), ValidationError>;

fn finite_in(value: f64, range: &RangeInclusive<f64>) -> bool {
    value.is_finite() && range.contains(&value)
}

pub fn validate_weight(weight_kg: f64) -> ValidationResult {
    if finite_in(weight_kg, &WEIGHT_RANGE_KG) {
        Ok(())
    } else {
        Err(ValidationError::WeightOutOfRange(weight_kg))
    }
}

pub fn validate_calories(calories: i64) -> ValidationResult {
    if CALORIE_RANGE.contains(&calories) {
        Ok(())
    } else {
        Err(ValidationError::CaloriesOutOfRange(calories))
    }
}

pub fn validate_ratio(ratio: f64) -> ValidationResult {
    if finite_in(ratio, &RATIO_RANGE) {
        Ok(())
    } else {
        Err(ValidationError::RatioOutOfRange(ratio))
    }
}

pub fn validate_food_name(name: &str) -> ValidationResult {
    if name.trim().is_empty() {
        Err(ValidationError::EmptyFoodName)
    } else {
        Ok(())
    }
}

fn validate_target_weight(start: f64, target: f64) -> ValidationResult {
    if !finite_in(target, &WEIGHT_RANGE_KG) {
        return Err(ValidationError::TargetWeightOutOfRange(target));
    }
    if target <= start {
        return Err(ValidationError::TargetNotAboveStart { start, target });
    }
    Ok(())
}

fn validate_target_distance(target: i64) -> ValidationResult {
    if target > 0 {
        Ok(())
    } else {
        Err(ValidationError::TargetDistanceNotPositive(target))
    }
}

fn validate_target_calories(target: i64) -> ValidationResult {
    if target > 0 {
        Ok(())
    } else {
        Err(ValidationError::TargetCaloriesNotPositive(target))
    }
}

/// Checks the whole setup request. The first violation wins; nothing is
/// written unless every field passes.
pub fn validate_setup(req: &SetupRequest) -> ValidationResult {
    if !finite_in(req.start_weight, &WEIGHT_RANGE_KG) {
        return Err(ValidationError::StartWeightOutOfRange(req.start_weight));
    }
    validate_target_weight(req.start_weight, req.target_weight)?;
    if !START_DISTANCE_RANGE_YD.contains(&req.start_distance) {
        return Err(ValidationError::StartDistanceOutOfRange(req.start_distance));
    }
    validate_target_distance(req.target_distance)?;
    validate_target_calories(req.target_calories)?;
    validate_ratio(req.kg_to_yd_ratio)
}

/// Checks a settings change against the recorded start weight. A profile
/// without a start weight only gets the range check on the target.
pub fn validate_settings(update: &SettingsUpdate, profile: &Profile) -> ValidationResult {
    if update.is_empty() {
        return Err(ValidationError::NothingToUpdate);
    }
    if let Some(target) = update.target_weight {
        match profile.start_weight {
            Some(start) => validate_target_weight(start, target)?,
            None if !finite_in(target, &WEIGHT_RANGE_KG) => {
                return Err(ValidationError::TargetWeightOutOfRange(target));
            }
            None => {}
        }
    }
    if let Some(distance) = update.target_distance {
        validate_target_distance(distance)?;
    }
    if let Some(calories) = update.target_calories {
        validate_target_calories(calories)?;
    }
    if let Some(ratio) = update.kg_to_yd_ratio {
        validate_ratio(ratio)?;
    }
    Ok(())
}

pub fn validate_new_meal(meal: &NewMeal) -> ValidationResult {
    validate_food_name(&meal.food_name)?;
    validate_calories(meal.calories)
}

pub fn validate_meal_update(update: &UpdateMeal) -> ValidationResult {
    if update.is_empty() {
        return Err(ValidationError::NothingToUpdate);
    }
    if let Some(ref name) = update.food_name {
        validate_food_name(name)?;
    }
    if let Some(calories) = update.calories {
        validate_calories(calories)?;
    }
    Ok(())
}

pub fn validate_template(template: &NewFoodTemplate) -> ValidationResult {
    if template.name.trim().is_empty() {
        return Err(ValidationError::EmptyTemplateName);
    }
    validate_calories(template.calories)
}

pub fn validate_template_update(update: &UpdateFoodTemplate) -> ValidationResult {
    if update.name.is_none() && update.calories.is_none() {
        return Err(ValidationError::NothingToUpdate);
    }
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ValidationError::EmptyTemplateName);
    }
    if let Some(calories) = update.calories {
        validate_calories(calories)?;
    }
    Ok(())
}

/// A missing profile row counts the same as an incomplete one.
#[must_use]
pub fn is_setup_complete(profile: Option<&Profile>) -> bool {
    profile.is_some_and(Profile::is_setup_complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MealType, UserId};
    use chrono::NaiveDate;

    fn setup(start: f64, target: f64, distance: i64) -> SetupRequest {
        SetupRequest {
            start_weight: start,
            target_weight: target,
            start_distance: distance,
            target_distance: 300,
            target_calories: 3000,
            kg_to_yd_ratio: 4.0,
        }
    }

    fn profile(start: Option<f64>, target: Option<f64>) -> Profile {
        Profile {
            id: UserId::from("u1"),
            email: None,
            start_weight: start,
            target_weight: target,
            start_distance: Some(260),
            target_distance: 300,
            target_calories: 3000,
            kg_to_yd_ratio: 4.0,
            start_date: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_weight_bounds() {
        assert!(validate_weight(30.0).is_ok());
        assert!(validate_weight(200.0).is_ok());
        assert!(validate_weight(72.4).is_ok());
        assert_eq!(
            validate_weight(29.9),
            Err(ValidationError::WeightOutOfRange(29.9))
        );
        assert!(validate_weight(200.1).is_err());
        assert!(validate_weight(f64::NAN).is_err());
        assert!(validate_weight(f64::INFINITY).is_err());
    }

    #[test]
    fn test_calorie_bounds() {
        assert!(validate_calories(0).is_ok());
        assert!(validate_calories(5000).is_ok());
        assert!(validate_calories(-1).is_err());
        assert!(validate_calories(5001).is_err());
    }

    #[test]
    fn test_ratio_bounds() {
        assert!(validate_ratio(3.0).is_ok());
        assert!(validate_ratio(5.0).is_ok());
        assert!(validate_ratio(2.99).is_err());
        assert!(validate_ratio(5.01).is_err());
        let err = validate_ratio(6.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Conversion ratio must be between 3 and 5 yd/kg (got 6)"
        );
    }

    #[test]
    fn test_setup_valid() {
        assert!(validate_setup(&setup(70.0, 80.0, 260)).is_ok());
    }

    #[test]
    fn test_setup_target_must_exceed_start() {
        assert_eq!(
            validate_setup(&setup(70.0, 65.0, 260)),
            Err(ValidationError::TargetNotAboveStart {
                start: 70.0,
                target: 65.0
            })
        );
        assert!(validate_setup(&setup(70.0, 70.0, 260)).is_err());
    }

    #[test]
    fn test_setup_ranges() {
        assert!(matches!(
            validate_setup(&setup(25.0, 80.0, 260)),
            Err(ValidationError::StartWeightOutOfRange(_))
        ));
        assert!(matches!(
            validate_setup(&setup(70.0, 210.0, 260)),
            Err(ValidationError::TargetWeightOutOfRange(_))
        ));
        assert!(matches!(
            validate_setup(&setup(70.0, 80.0, 149)),
            Err(ValidationError::StartDistanceOutOfRange(149))
        ));
        assert!(validate_setup(&setup(70.0, 80.0, 150)).is_ok());
        assert!(validate_setup(&setup(70.0, 80.0, 350)).is_ok());

        let mut req = setup(70.0, 80.0, 260);
        req.kg_to_yd_ratio = 2.0;
        assert!(matches!(
            validate_setup(&req),
            Err(ValidationError::RatioOutOfRange(_))
        ));

        let mut req = setup(70.0, 80.0, 260);
        req.target_calories = 0;
        assert!(matches!(
            validate_setup(&req),
            Err(ValidationError::TargetCaloriesNotPositive(0))
        ));
    }

    #[test]
    fn test_settings_target_weight_above_start() {
        let p = profile(Some(70.0), Some(80.0));
        let update = SettingsUpdate {
            target_weight: Some(68.0),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&update, &p),
            Err(ValidationError::TargetNotAboveStart { .. })
        ));

        let update = SettingsUpdate {
            target_weight: Some(85.0),
            kg_to_yd_ratio: Some(4.5),
            ..Default::default()
        };
        assert!(validate_settings(&update, &p).is_ok());
    }

    #[test]
    fn test_settings_rejects_empty_and_bad_values() {
        let p = profile(Some(70.0), Some(80.0));
        assert_eq!(
            validate_settings(&SettingsUpdate::default(), &p),
            Err(ValidationError::NothingToUpdate)
        );
        let update = SettingsUpdate {
            target_distance: Some(0),
            ..Default::default()
        };
        assert!(validate_settings(&update, &p).is_err());
        let update = SettingsUpdate {
            kg_to_yd_ratio: Some(7.0),
            ..Default::default()
        };
        assert!(validate_settings(&update, &p).is_err());
    }

    #[test]
    fn test_meal_rules() {
        let meal = NewMeal {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            meal_type: MealType::Lunch,
            food_name: "Ramen".to_string(),
            calories: 900,
        };
        assert!(validate_new_meal(&meal).is_ok());

        let blank = NewMeal {
            food_name: "   ".to_string(),
            ..meal.clone()
        };
        assert_eq!(
            validate_new_meal(&blank),
            Err(ValidationError::EmptyFoodName)
        );

        let heavy = NewMeal {
            calories: 6000,
            ..meal
        };
        assert!(validate_new_meal(&heavy).is_err());

        assert_eq!(
            validate_meal_update(&UpdateMeal::default()),
            Err(ValidationError::NothingToUpdate)
        );
        let update = UpdateMeal {
            calories: Some(-5),
            ..Default::default()
        };
        assert!(validate_meal_update(&update).is_err());
    }

    #[test]
    fn test_template_rules() {
        let ok = NewFoodTemplate {
            name: "Protein shake".to_string(),
            calories: 350,
        };
        assert!(validate_template(&ok).is_ok());
        let blank = NewFoodTemplate {
            name: String::new(),
            calories: 350,
        };
        assert_eq!(
            validate_template(&blank),
            Err(ValidationError::EmptyTemplateName)
        );
        let rename = UpdateFoodTemplate {
            name: Some(" ".to_string()),
            calories: None,
        };
        assert!(validate_template_update(&rename).is_err());
        assert!(validate_template_update(&UpdateFoodTemplate::default()).is_err());
    }

    #[test]
    fn test_is_setup_complete() {
        assert!(!is_setup_complete(None));
        assert!(!is_setup_complete(Some(&profile(Some(70.0), None))));
        assert!(!is_setup_complete(Some(&profile(None, Some(80.0)))));
        assert!(is_setup_complete(Some(&profile(Some(70.0), Some(80.0)))));
    }
}
