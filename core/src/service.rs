use std::fmt::Write;
use std::path::Path;

use chrono::NaiveDate;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::aggregation::{self, CHART_WINDOW};
use crate::commentary::{FeedbackSummary, RECENT_WEIGHT_LOGS};
use crate::db::Database;
use crate::error::{TrackerError, TrackerResult};
use crate::gate::Session;
use crate::models::{
    ChartSeries, Dashboard, FoodTemplate, Meal, MealsByCategory, NewFoodTemplate, NewMeal,
    NewWeightLog, Profile, SettingsUpdate, SetupRequest, UpdateFoodTemplate, UpdateMeal, UserId,
    WeightLog, WeightQuery,
};
use crate::validation;

/// Every operation on a user's data. The caller supplies the identity; this
/// type never decides who is asking.
pub struct TrackerService {
    db: Database,
}

impl TrackerService {
    pub fn new(db_path: &Path) -> TrackerResult<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> TrackerResult<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    fn require_profile(&self, user: &UserId) -> TrackerResult<Profile> {
        self.db
            .get_profile(user)?
            .ok_or_else(|| TrackerError::not_found("Profile not found"))
    }

    // --- Accounts ---

    pub fn create_account(&self, email: Option<&str>) -> TrackerResult<Profile> {
        let user = UserId::generate();
        let profile = self.db.insert_profile(&user, email)?;
        debug!(user = %user, "Created account");
        Ok(profile)
    }

    /// Returns the profile for `user`, creating an empty one on first use.
    pub fn ensure_account(&self, user: &UserId) -> TrackerResult<Profile> {
        if let Some(profile) = self.db.get_profile(user)? {
            return Ok(profile);
        }
        let profile = self.db.insert_profile(user, None)?;
        debug!(user = %user, "Created local account");
        Ok(profile)
    }

    pub fn get_profile(&self, user: &UserId) -> TrackerResult<Profile> {
        self.require_profile(user)
    }

    /// Gate input for a request. `None` means no identity was presented.
    pub fn session_for(&self, user: Option<&UserId>) -> TrackerResult<Session> {
        match user {
            None => Ok(Session::Anonymous),
            Some(user) => {
                let profile = self.db.get_profile(user)?;
                Ok(Session::for_profile(profile.as_ref()))
            }
        }
    }

    // --- Tokens ---

    /// Issues a new bearer token. Only its hash is stored; the returned plain
    /// token cannot be recovered later.
    pub fn issue_token(&self, user: &UserId) -> TrackerResult<String> {
        self.require_profile(user)?;
        let bytes: [u8; 32] = rand::rng().random();
        let token = to_hex(&bytes);
        self.db.insert_token(user, &hash_token(&token))?;
        debug!(user = %user, "Issued API token");
        Ok(token)
    }

    pub fn resolve_token(&self, token: &str) -> TrackerResult<Option<UserId>> {
        Ok(self.db.user_for_token(&hash_token(token))?)
    }

    // --- Setup & settings ---

    pub fn complete_setup(
        &self,
        user: &UserId,
        req: &SetupRequest,
        today: NaiveDate,
    ) -> TrackerResult<Profile> {
        let profile = self.require_profile(user)?;
        if profile.is_setup_complete() {
            return Err(TrackerError::SetupAlreadyComplete);
        }
        validation::validate_setup(req)?;
        let profile = self
            .db
            .complete_setup(user, req, today)?
            .ok_or(TrackerError::SetupAlreadyComplete)?;
        debug!(user = %user, start_weight = req.start_weight, "Completed setup");
        Ok(profile)
    }

    pub fn update_settings(
        &self,
        user: &UserId,
        update: &SettingsUpdate,
    ) -> TrackerResult<Profile> {
        let profile = self.require_profile(user)?;
        if !profile.is_setup_complete() {
            return Err(TrackerError::SetupIncomplete);
        }
        validation::validate_settings(update, &profile)?;
        let profile = self
            .db
            .update_settings(user, update)?
            .ok_or_else(|| TrackerError::not_found("Profile not found"))?;
        debug!(user = %user, "Updated settings");
        Ok(profile)
    }

    // --- Weight ---

    /// Records the weight for a day, replacing any existing value for that day.
    pub fn record_weight(&self, user: &UserId, entry: &NewWeightLog) -> TrackerResult<WeightLog> {
        validation::validate_weight(entry.weight_kg)?;
        let log = self.db.upsert_weight(user, entry)?;
        debug!(user = %user, date = %entry.date, weight_kg = entry.weight_kg, "Recorded weight");
        Ok(log)
    }

    pub fn edit_weight(&self, user: &UserId, id: i64, weight_kg: f64) -> TrackerResult<WeightLog> {
        validation::validate_weight(weight_kg)?;
        let log = self
            .db
            .update_weight(user, id, weight_kg)?
            .ok_or_else(|| TrackerError::not_found(format!("Weight log {id} not found")))?;
        debug!(user = %user, id, weight_kg, "Edited weight");
        Ok(log)
    }

    pub fn delete_weight(&self, user: &UserId, id: i64) -> TrackerResult<()> {
        if !self.db.delete_weight(user, id)? {
            return Err(TrackerError::not_found(format!("Weight log {id} not found")));
        }
        debug!(user = %user, id, "Deleted weight");
        Ok(())
    }

    pub fn list_weights(&self, user: &UserId, query: WeightQuery) -> TrackerResult<Vec<WeightLog>> {
        Ok(self.db.list_weights(user, query)?)
    }

    pub fn weight_chart(&self, user: &UserId) -> TrackerResult<ChartSeries> {
        let profile = self.require_profile(user)?;
        let logs = self.db.list_weights(user, WeightQuery::Recent(CHART_WINDOW))?;
        Ok(aggregation::chart_series(
            &logs,
            profile.start_weight,
            profile.target_weight,
        ))
    }

    // --- Meals ---

    pub fn log_meal(&self, user: &UserId, meal: &NewMeal) -> TrackerResult<Meal> {
        validation::validate_new_meal(meal)?;
        let meal = self.db.insert_meal(user, meal)?;
        debug!(user = %user, id = meal.id, calories = meal.calories, "Logged meal");
        Ok(meal)
    }

    pub fn update_meal(&self, user: &UserId, id: i64, update: &UpdateMeal) -> TrackerResult<Meal> {
        validation::validate_meal_update(update)?;
        let meal = self
            .db
            .update_meal(user, id, update)?
            .ok_or_else(|| TrackerError::not_found(format!("Meal {id} not found")))?;
        debug!(user = %user, id, "Updated meal");
        Ok(meal)
    }

    pub fn delete_meal(&self, user: &UserId, id: i64) -> TrackerResult<()> {
        if !self.db.delete_meal(user, id)? {
            return Err(TrackerError::not_found(format!("Meal {id} not found")));
        }
        debug!(user = %user, id, "Deleted meal");
        Ok(())
    }

    /// One day's meals, or every meal newest day first when `date` is `None`.
    pub fn list_meals(&self, user: &UserId, date: Option<NaiveDate>) -> TrackerResult<Vec<Meal>> {
        let meals = match date {
            Some(date) => self.db.meals_for_date(user, date)?,
            None => self.db.all_meals(user)?,
        };
        Ok(meals)
    }

    pub fn meals_by_category(
        &self,
        user: &UserId,
        date: NaiveDate,
    ) -> TrackerResult<MealsByCategory> {
        let meals = self.db.meals_for_date(user, date)?;
        Ok(aggregation::group_by_category(&meals))
    }

    pub fn daily_calorie_total(&self, user: &UserId, date: NaiveDate) -> TrackerResult<i64> {
        let meals = self.db.meals_for_date(user, date)?;
        Ok(aggregation::daily_calorie_total(&meals, date))
    }

    // --- Food templates ---

    pub fn create_template(
        &self,
        user: &UserId,
        template: &NewFoodTemplate,
    ) -> TrackerResult<FoodTemplate> {
        validation::validate_template(template)?;
        let template = self.db.insert_template(user, template)?;
        debug!(user = %user, id = template.id, "Created food template");
        Ok(template)
    }

    pub fn update_template(
        &self,
        user: &UserId,
        id: i64,
        update: &UpdateFoodTemplate,
    ) -> TrackerResult<FoodTemplate> {
        validation::validate_template_update(update)?;
        self.db
            .update_template(user, id, update)?
            .ok_or_else(|| TrackerError::not_found(format!("Food template {id} not found")))
    }

    pub fn delete_template(&self, user: &UserId, id: i64) -> TrackerResult<()> {
        if !self.db.delete_template(user, id)? {
            return Err(TrackerError::not_found(format!(
                "Food template {id} not found"
            )));
        }
        debug!(user = %user, id, "Deleted food template");
        Ok(())
    }

    pub fn get_template(&self, user: &UserId, id: i64) -> TrackerResult<FoodTemplate> {
        self.db
            .get_template(user, id)?
            .ok_or_else(|| TrackerError::not_found(format!("Food template {id} not found")))
    }

    pub fn list_templates(&self, user: &UserId) -> TrackerResult<Vec<FoodTemplate>> {
        Ok(self.db.list_templates(user)?)
    }

    /// Copies a meal's name and calories into a new template. The two rows
    /// stay independent afterwards.
    pub fn template_from_meal(&self, user: &UserId, meal_id: i64) -> TrackerResult<FoodTemplate> {
        let meal = self
            .db
            .get_meal(user, meal_id)?
            .ok_or_else(|| TrackerError::not_found(format!("Meal {meal_id} not found")))?;
        self.create_template(
            user,
            &NewFoodTemplate {
                name: meal.food_name,
                calories: meal.calories,
            },
        )
    }

    // --- Derived views ---

    pub fn dashboard(&self, user: &UserId, today: NaiveDate) -> TrackerResult<Dashboard> {
        let profile = self.require_profile(user)?;
        let logs = self.db.list_weights(user, WeightQuery::Recent(CHART_WINDOW))?;
        let meals = self.db.meals_for_date(user, today)?;
        Ok(aggregation::build_dashboard(&profile, &logs, &meals, today))
    }

    pub fn feedback_summary(&self, user: &UserId) -> TrackerResult<FeedbackSummary> {
        let profile = self.require_profile(user)?;
        let logs = self
            .db
            .list_weights(user, WeightQuery::Recent(RECENT_WEIGHT_LOGS))?;
        let meals = self.db.all_meals(user)?;
        Ok(FeedbackSummary::assemble(&profile, &logs, &meals))
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

fn hash_token(token: &str) -> String {
    to_hex(&Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::build_prompt;
    use crate::gate::{GateDecision, RouteKind, decide};
    use crate::models::{CalorieStatus, MealType};
    use crate::validation::ValidationError;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup_request() -> SetupRequest {
        SetupRequest {
            start_weight: 70.0,
            target_weight: 80.0,
            start_distance: 260,
            target_distance: 300,
            target_calories: 3000,
            kg_to_yd_ratio: 4.0,
        }
    }

    fn ready_user(svc: &TrackerService) -> UserId {
        let profile = svc.create_account(Some("golfer@example.com")).unwrap();
        svc.complete_setup(&profile.id, &setup_request(), d("2026-03-01"))
            .unwrap();
        profile.id
    }

    fn meal(date: &str, meal_type: MealType, name: &str, calories: i64) -> NewMeal {
        NewMeal {
            date: d(date),
            meal_type,
            food_name: name.to_string(),
            calories,
        }
    }

    #[test]
    fn test_setup_flow_and_gate() {
        let svc = TrackerService::new_in_memory().unwrap();
        let profile = svc.create_account(None).unwrap();
        let user = profile.id;

        let session = svc.session_for(Some(&user)).unwrap();
        assert_eq!(decide(session, RouteKind::App), GateDecision::RedirectToSetup);
        assert_eq!(decide(session, RouteKind::Setup), GateDecision::Allow);

        let profile = svc
            .complete_setup(&user, &setup_request(), d("2026-03-01"))
            .unwrap();
        assert_eq!(profile.start_date, Some(d("2026-03-01")));

        let session = svc.session_for(Some(&user)).unwrap();
        assert_eq!(decide(session, RouteKind::App), GateDecision::Allow);
        assert_eq!(decide(session, RouteKind::Setup), GateDecision::RedirectToApp);

        let first = svc.list_weights(&user, WeightQuery::All).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].weight_kg, 70.0);
    }

    #[test]
    fn test_session_for_unknown_user_is_incomplete() {
        let svc = TrackerService::new_in_memory().unwrap();
        assert_eq!(svc.session_for(None).unwrap(), Session::Anonymous);
        let session = svc.session_for(Some(&UserId::from("ghost"))).unwrap();
        assert_eq!(
            session,
            Session::Authenticated {
                setup_complete: false
            }
        );
    }

    #[test]
    fn test_setup_rejects_target_below_start_atomically() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = svc.create_account(None).unwrap().id;
        let req = SetupRequest {
            target_weight: 65.0,
            ..setup_request()
        };
        let err = svc.complete_setup(&user, &req, d("2026-03-01")).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::TargetNotAboveStart { .. })
        ));

        let profile = svc.get_profile(&user).unwrap();
        assert!(profile.start_weight.is_none());
        assert!(profile.target_weight.is_none());
        assert!(svc.list_weights(&user, WeightQuery::All).unwrap().is_empty());
    }

    #[test]
    fn test_setup_twice_fails() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        let err = svc
            .complete_setup(&user, &setup_request(), d("2026-03-05"))
            .unwrap_err();
        assert!(matches!(err, TrackerError::SetupAlreadyComplete));
    }

    #[test]
    fn test_setup_unknown_profile() {
        let svc = TrackerService::new_in_memory().unwrap();
        let err = svc
            .complete_setup(&UserId::from("ghost"), &setup_request(), d("2026-03-01"))
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }

    #[test]
    fn test_settings_require_setup_and_keep_start_values() {
        let svc = TrackerService::new_in_memory().unwrap();
        let fresh = svc.create_account(None).unwrap().id;
        let update = SettingsUpdate {
            target_weight: Some(85.0),
            ..Default::default()
        };
        assert!(matches!(
            svc.update_settings(&fresh, &update).unwrap_err(),
            TrackerError::SetupIncomplete
        ));

        let user = ready_user(&svc);
        let profile = svc.update_settings(&user, &update).unwrap();
        assert_eq!(profile.target_weight, Some(85.0));
        assert_eq!(profile.start_weight, Some(70.0));

        let too_low = SettingsUpdate {
            target_weight: Some(69.0),
            ..Default::default()
        };
        assert!(matches!(
            svc.update_settings(&user, &too_low).unwrap_err(),
            TrackerError::Validation(_)
        ));
    }

    #[test]
    fn test_record_weight_upserts_by_date() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        let date = d("2026-03-02");
        svc.record_weight(&user, &NewWeightLog { date, weight_kg: 71.0 })
            .unwrap();
        svc.record_weight(&user, &NewWeightLog { date, weight_kg: 71.6 })
            .unwrap();

        let logs = svc.list_weights(&user, WeightQuery::All).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].date, date);
        assert_eq!(logs[0].weight_kg, 71.6);
    }

    #[test]
    fn test_record_weight_out_of_range() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        let err = svc
            .record_weight(&user, &NewWeightLog { date: d("2026-03-02"), weight_kg: 250.0 })
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::WeightOutOfRange(_))
        ));
    }

    #[test]
    fn test_foreign_rows_are_not_found() {
        let svc = TrackerService::new_in_memory().unwrap();
        let alice = ready_user(&svc);
        let bob = ready_user(&svc);

        let log = svc
            .record_weight(&alice, &NewWeightLog { date: d("2026-03-03"), weight_kg: 71.0 })
            .unwrap();
        let lunch = svc
            .log_meal(&alice, &meal("2026-03-03", MealType::Lunch, "Curry", 800))
            .unwrap();

        assert!(matches!(
            svc.edit_weight(&bob, log.id, 72.0).unwrap_err(),
            TrackerError::NotFound(_)
        ));
        assert!(matches!(
            svc.delete_weight(&bob, log.id).unwrap_err(),
            TrackerError::NotFound(_)
        ));
        assert!(matches!(
            svc.delete_meal(&bob, lunch.id).unwrap_err(),
            TrackerError::NotFound(_)
        ));
        assert!(matches!(
            svc.template_from_meal(&bob, lunch.id).unwrap_err(),
            TrackerError::NotFound(_)
        ));

        // Alice's rows are untouched.
        assert_eq!(svc.list_meals(&alice, None).unwrap().len(), 1);
        svc.edit_weight(&alice, log.id, 72.0).unwrap();
    }

    #[test]
    fn test_meals_by_category_and_total() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        let date = "2026-03-04";
        svc.log_meal(&user, &meal(date, MealType::Breakfast, "Eggs", 500))
            .unwrap();
        svc.log_meal(&user, &meal(date, MealType::Lunch, "Rice bowl", 700))
            .unwrap();
        svc.log_meal(&user, &meal(date, MealType::Lunch, "Juice", 300))
            .unwrap();
        svc.log_meal(&user, &meal("2026-03-05", MealType::Dinner, "Steak", 900))
            .unwrap();

        assert_eq!(svc.daily_calorie_total(&user, d(date)).unwrap(), 1500);
        assert_eq!(svc.daily_calorie_total(&user, d("2026-03-06")).unwrap(), 0);

        let grouped = svc.meals_by_category(&user, d(date)).unwrap();
        assert_eq!(grouped.category(MealType::Lunch).len(), 2);
        assert!(grouped.category(MealType::Dinner).is_empty());
        assert!(grouped.category(MealType::Snack).is_empty());
        assert_eq!(grouped.total_calories, 1500);
    }

    #[test]
    fn test_log_meal_validation() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        let err = svc
            .log_meal(&user, &meal("2026-03-04", MealType::Snack, "Cake", 5001))
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::CaloriesOutOfRange(5001))
        ));
        assert!(svc.list_meals(&user, None).unwrap().is_empty());
    }

    #[test]
    fn test_template_from_meal_copies_values() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        let lunch = svc
            .log_meal(&user, &meal("2026-03-04", MealType::Lunch, "Katsu curry", 950))
            .unwrap();
        let template = svc.template_from_meal(&user, lunch.id).unwrap();
        assert_eq!(template.name, "Katsu curry");
        assert_eq!(template.calories, 950);

        // Deleting the template leaves the meal alone and vice versa.
        svc.delete_template(&user, template.id).unwrap();
        assert_eq!(svc.list_meals(&user, None).unwrap().len(), 1);

        let template = svc.template_from_meal(&user, lunch.id).unwrap();
        svc.delete_meal(&user, lunch.id).unwrap();
        assert_eq!(svc.list_templates(&user).unwrap()[0].id, template.id);
        assert_eq!(svc.get_template(&user, template.id).unwrap().calories, 950);
    }

    #[test]
    fn test_dashboard_end_to_end() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        svc.record_weight(&user, &NewWeightLog { date: d("2026-03-10"), weight_kg: 75.0 })
            .unwrap();
        svc.log_meal(&user, &meal("2026-03-10", MealType::Dinner, "Steak", 3100))
            .unwrap();

        let dash = svc.dashboard(&user, d("2026-03-10")).unwrap();
        assert_eq!(dash.distance.estimated_distance, 280);
        assert_eq!(dash.distance.remaining_distance, 20);
        assert_eq!(dash.weight.current_weight, 75.0);
        assert_eq!(dash.calories.progress_percent, 103);
        assert_eq!(dash.calories.status, CalorieStatus::Complete);
        assert_eq!(dash.chart.points.len(), 2);
        assert_eq!(dash.chart.points[0].date, d("2026-03-01"));
    }

    #[test]
    fn test_weight_chart_window() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        for day in 2..=20 {
            let date = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
            svc.record_weight(&user, &NewWeightLog { date, weight_kg: 70.0 + f64::from(day) * 0.1 })
                .unwrap();
        }
        let chart = svc.weight_chart(&user).unwrap();
        assert_eq!(chart.points.len(), 14);
        assert!(chart.points.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(chart.points[13].date, d("2026-03-20"));
    }

    #[test]
    fn test_feedback_summary() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        svc.record_weight(&user, &NewWeightLog { date: d("2026-03-02"), weight_kg: 71.0 })
            .unwrap();
        for (day, cal) in [("2026-03-02", 2800), ("2026-03-03", 3100), ("2026-03-04", 2500), ("2026-03-05", 2900)] {
            svc.log_meal(&user, &meal(day, MealType::Dinner, "Pasta", cal))
                .unwrap();
        }

        let summary = svc.feedback_summary(&user).unwrap();
        assert_eq!(summary.current_weight, 71.0);
        assert_eq!(summary.estimated_distance, 264);
        assert_eq!(summary.recent_weights.len(), 2);
        assert_eq!(summary.recent_calories.len(), 3);
        assert_eq!(summary.recent_calories[0].date, d("2026-03-05"));

        let prompt = build_prompt(&summary);
        assert!(prompt.contains("2026-03-05: 2900kcal"));
        assert!(!prompt.contains("2026-03-02: 2800kcal"));
    }

    #[test]
    fn test_feedback_summary_keeps_last_seven_weights() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = ready_user(&svc);
        for day in 2..=12 {
            let date = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
            svc.record_weight(&user, &NewWeightLog { date, weight_kg: 70.0 + f64::from(day) / 10.0 })
                .unwrap();
        }

        let summary = svc.feedback_summary(&user).unwrap();
        assert_eq!(summary.recent_weights.len(), 7);
        assert_eq!(summary.recent_weights[0].date, d("2026-03-12"));
        assert_eq!(summary.recent_weights[6].date, d("2026-03-06"));
        assert!((summary.current_weight - 71.2).abs() < 1e-9);
    }

    #[test]
    fn test_tokens_resolve_to_owner() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = svc.create_account(None).unwrap().id;
        let token = svc.issue_token(&user).unwrap();
        assert_eq!(token.len(), 64);
        assert_eq!(svc.resolve_token(&token).unwrap(), Some(user.clone()));
        assert!(svc.resolve_token("not-a-token").unwrap().is_none());

        let second = svc.issue_token(&user).unwrap();
        assert_ne!(token, second);
        assert_eq!(svc.resolve_token(&second).unwrap(), Some(user));
    }

    #[test]
    fn test_ensure_account_is_idempotent() {
        let svc = TrackerService::new_in_memory().unwrap();
        let user = UserId::from("local");
        let first = svc.ensure_account(&user).unwrap();
        let second = svc.ensure_account(&user).unwrap();
        assert_eq!(first.created_at, second.created_at);
    }

    #[test]
    fn test_hash_token_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
