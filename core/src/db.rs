use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::{
    FoodTemplate, Meal, MealType, NewFoodTemplate, NewMeal, NewWeightLog, Profile, SettingsUpdate,
    SetupRequest, UpdateFoodTemplate, UpdateMeal, UserId, WeightLog, WeightQuery,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

const PROFILE_COLUMNS: &str = "id, email, start_weight, target_weight, start_distance,
     target_distance, target_calories, kg_to_yd_ratio, start_date, created_at, updated_at";
const WEIGHT_COLUMNS: &str = "id, date, weight_kg, created_at, updated_at";
const MEAL_COLUMNS: &str = "id, date, meal_type, food_name, calories, created_at";
const TEMPLATE_COLUMNS: &str = "id, name, calories, created_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn
                .execute_batch(
                    "CREATE TABLE IF NOT EXISTS profiles (
                    id TEXT PRIMARY KEY,
                    email TEXT,
                    start_weight REAL,
                    target_weight REAL,
                    start_distance INTEGER,
                    target_distance INTEGER NOT NULL DEFAULT 300,
                    target_calories INTEGER NOT NULL DEFAULT 3000,
                    kg_to_yd_ratio REAL NOT NULL DEFAULT 4.0
                        CHECK (kg_to_yd_ratio BETWEEN 3 AND 5),
                    start_date TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS weight_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                    date TEXT NOT NULL,
                    weight_kg REAL NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE (user_id, date)
                );

                CREATE TABLE IF NOT EXISTS meals (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                    date TEXT NOT NULL,
                    meal_type TEXT NOT NULL,
                    food_name TEXT NOT NULL,
                    calories INTEGER NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS food_templates (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    calories INTEGER NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS api_tokens (
                    token_hash TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_weight_logs_user_date ON weight_logs(user_id, date);
                CREATE INDEX IF NOT EXISTS idx_meals_user_date ON meals(user_id, date);
                CREATE INDEX IF NOT EXISTS idx_food_templates_user ON food_templates(user_id, name);

                PRAGMA user_version = 1;",
                )
                .context("Failed to create schema")?;
        }

        Ok(())
    }

    // --- Row mapping ---

    fn profile_from_row(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        let id: String = row.get(0)?;
        let start_date: Option<String> = row.get(8)?;
        Ok(Profile {
            id: UserId::from(id),
            email: row.get(1)?,
            start_weight: row.get(2)?,
            target_weight: row.get(3)?,
            start_distance: row.get(4)?,
            target_distance: row.get(5)?,
            target_calories: row.get(6)?,
            kg_to_yd_ratio: row.get(7)?,
            start_date: start_date.map(|s| parse_date(8, &s)).transpose()?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn weight_log_from_row(row: &rusqlite::Row) -> rusqlite::Result<WeightLog> {
        let date: String = row.get(1)?;
        Ok(WeightLog {
            id: row.get(0)?,
            date: parse_date(1, &date)?,
            weight_kg: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn meal_from_row(row: &rusqlite::Row) -> rusqlite::Result<Meal> {
        let date: String = row.get(1)?;
        let meal_type: String = row.get(2)?;
        Ok(Meal {
            id: row.get(0)?,
            date: parse_date(1, &date)?,
            meal_type: meal_type
                .parse::<MealType>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
            food_name: row.get(3)?,
            calories: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn template_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodTemplate> {
        Ok(FoodTemplate {
            id: row.get(0)?,
            name: row.get(1)?,
            calories: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    // --- Profiles ---

    pub fn insert_profile(&self, user: &UserId, email: Option<&str>) -> Result<Profile> {
        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO profiles (id, email, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![user.as_str(), email, now, now],
            )
            .context("Failed to insert profile")?;
        self.get_profile(user)?
            .context("Profile not found after insert")
    }

    pub fn get_profile(&self, user: &UserId) -> Result<Option<Profile>> {
        self.conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
                params![user.as_str()],
                Self::profile_from_row,
            )
            .optional()
            .context("Failed to load profile")
    }

    /// Writes the setup values and the first weight log in one transaction.
    /// Returns `None` when the profile is missing or setup already happened.
    pub fn complete_setup(
        &self,
        user: &UserId,
        req: &SetupRequest,
        today: NaiveDate,
    ) -> Result<Option<Profile>> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Local::now().to_rfc3339();
        let rows = tx
            .execute(
                "UPDATE profiles SET
                    start_weight = ?1,
                    target_weight = ?2,
                    start_distance = ?3,
                    target_distance = ?4,
                    target_calories = ?5,
                    kg_to_yd_ratio = ?6,
                    start_date = ?7,
                    updated_at = ?8
                 WHERE id = ?9 AND (start_weight IS NULL OR target_weight IS NULL)",
                params![
                    req.start_weight,
                    req.target_weight,
                    req.start_distance,
                    req.target_distance,
                    req.target_calories,
                    req.kg_to_yd_ratio,
                    today.format(DATE_FORMAT).to_string(),
                    now,
                    user.as_str(),
                ],
            )
            .context("Failed to write setup values")?;
        if rows == 0 {
            return Ok(None);
        }
        upsert_weight_on(
            &tx,
            user,
            &NewWeightLog {
                date: today,
                weight_kg: req.start_weight,
            },
        )?;
        tx.commit().context("Failed to commit setup")?;
        self.get_profile(user)
    }

    pub fn update_settings(&self, user: &UserId, update: &SettingsUpdate) -> Result<Option<Profile>> {
        let now = Local::now().to_rfc3339();
        let rows = self
            .conn
            .execute(
                "UPDATE profiles SET
                    target_weight = COALESCE(?1, target_weight),
                    target_distance = COALESCE(?2, target_distance),
                    target_calories = COALESCE(?3, target_calories),
                    kg_to_yd_ratio = COALESCE(?4, kg_to_yd_ratio),
                    updated_at = ?5
                 WHERE id = ?6",
                params![
                    update.target_weight,
                    update.target_distance,
                    update.target_calories,
                    update.kg_to_yd_ratio,
                    now,
                    user.as_str(),
                ],
            )
            .context("Failed to update settings")?;
        if rows == 0 {
            return Ok(None);
        }
        self.get_profile(user)
    }

    // --- Weight logs ---

    pub fn upsert_weight(&self, user: &UserId, entry: &NewWeightLog) -> Result<WeightLog> {
        upsert_weight_on(&self.conn, user, entry)?;
        self.get_weight_by_date(user, entry.date)?
            .context("Weight log not found after upsert")
    }

    pub fn get_weight(&self, user: &UserId, id: i64) -> Result<Option<WeightLog>> {
        self.conn
            .query_row(
                &format!("SELECT {WEIGHT_COLUMNS} FROM weight_logs WHERE id = ?1 AND user_id = ?2"),
                params![id, user.as_str()],
                Self::weight_log_from_row,
            )
            .optional()
            .context("Failed to load weight log")
    }

    pub fn get_weight_by_date(&self, user: &UserId, date: NaiveDate) -> Result<Option<WeightLog>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {WEIGHT_COLUMNS} FROM weight_logs WHERE user_id = ?1 AND date = ?2"
                ),
                params![user.as_str(), date.format(DATE_FORMAT).to_string()],
                Self::weight_log_from_row,
            )
            .optional()
            .context("Failed to load weight log")
    }

    /// Changes the value of an existing log. The date stays fixed.
    pub fn update_weight(&self, user: &UserId, id: i64, weight_kg: f64) -> Result<Option<WeightLog>> {
        let now = Local::now().to_rfc3339();
        let rows = self
            .conn
            .execute(
                "UPDATE weight_logs SET weight_kg = ?1, updated_at = ?2
                 WHERE id = ?3 AND user_id = ?4",
                params![weight_kg, now, id, user.as_str()],
            )
            .context("Failed to update weight log")?;
        if rows == 0 {
            return Ok(None);
        }
        self.get_weight(user, id)
    }

    pub fn delete_weight(&self, user: &UserId, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM weight_logs WHERE id = ?1 AND user_id = ?2",
                params![id, user.as_str()],
            )
            .context("Failed to delete weight log")?;
        Ok(rows > 0)
    }

    /// Logs newest first.
    pub fn list_weights(&self, user: &UserId, query: WeightQuery) -> Result<Vec<WeightLog>> {
        // SQLite treats a negative LIMIT as no limit.
        let (start, end, limit) = match query {
            WeightQuery::All => (None, None, -1),
            WeightQuery::Recent(n) => (None, None, i64::from(n)),
            WeightQuery::Range { start, end } => (start, end, -1),
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WEIGHT_COLUMNS} FROM weight_logs
             WHERE user_id = ?1
               AND (?2 IS NULL OR date >= ?2)
               AND (?3 IS NULL OR date <= ?3)
             ORDER BY date DESC
             LIMIT ?4"
        ))?;
        let logs = stmt
            .query_map(
                params![
                    user.as_str(),
                    start.map(|d| d.format(DATE_FORMAT).to_string()),
                    end.map(|d| d.format(DATE_FORMAT).to_string()),
                    limit,
                ],
                Self::weight_log_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    // --- Meals ---

    pub fn insert_meal(&self, user: &UserId, meal: &NewMeal) -> Result<Meal> {
        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO meals (user_id, date, meal_type, food_name, calories, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.as_str(),
                    meal.date.format(DATE_FORMAT).to_string(),
                    meal.meal_type.as_str(),
                    meal.food_name.trim(),
                    meal.calories,
                    now,
                ],
            )
            .context("Failed to insert meal")?;
        let id = self.conn.last_insert_rowid();
        self.get_meal(user, id)?
            .context("Meal not found after insert")
    }

    pub fn get_meal(&self, user: &UserId, id: i64) -> Result<Option<Meal>> {
        self.conn
            .query_row(
                &format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = ?1 AND user_id = ?2"),
                params![id, user.as_str()],
                Self::meal_from_row,
            )
            .optional()
            .context("Failed to load meal")
    }

    pub fn update_meal(&self, user: &UserId, id: i64, update: &UpdateMeal) -> Result<Option<Meal>> {
        let rows = self
            .conn
            .execute(
                "UPDATE meals SET
                    date = COALESCE(?1, date),
                    meal_type = COALESCE(?2, meal_type),
                    food_name = COALESCE(?3, food_name),
                    calories = COALESCE(?4, calories)
                 WHERE id = ?5 AND user_id = ?6",
                params![
                    update.date.map(|d| d.format(DATE_FORMAT).to_string()),
                    update.meal_type.map(MealType::as_str),
                    update.food_name.as_deref().map(str::trim),
                    update.calories,
                    id,
                    user.as_str(),
                ],
            )
            .context("Failed to update meal")?;
        if rows == 0 {
            return Ok(None);
        }
        self.get_meal(user, id)
    }

    pub fn delete_meal(&self, user: &UserId, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM meals WHERE id = ?1 AND user_id = ?2",
                params![id, user.as_str()],
            )
            .context("Failed to delete meal")?;
        Ok(rows > 0)
    }

    /// Meals for one day in the order they were logged.
    pub fn meals_for_date(&self, user: &UserId, date: NaiveDate) -> Result<Vec<Meal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE user_id = ?1 AND date = ?2 ORDER BY id"
        ))?;
        let meals = stmt
            .query_map(
                params![user.as_str(), date.format(DATE_FORMAT).to_string()],
                Self::meal_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    /// Every meal, newest day first.
    pub fn all_meals(&self, user: &UserId) -> Result<Vec<Meal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE user_id = ?1 ORDER BY date DESC, id"
        ))?;
        let meals = stmt
            .query_map(params![user.as_str()], Self::meal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    // --- Food templates ---

    pub fn insert_template(&self, user: &UserId, template: &NewFoodTemplate) -> Result<FoodTemplate> {
        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO food_templates (user_id, name, calories, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user.as_str(), template.name.trim(), template.calories, now],
            )
            .context("Failed to insert food template")?;
        let id = self.conn.last_insert_rowid();
        self.get_template(user, id)?
            .context("Food template not found after insert")
    }

    pub fn get_template(&self, user: &UserId, id: i64) -> Result<Option<FoodTemplate>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {TEMPLATE_COLUMNS} FROM food_templates WHERE id = ?1 AND user_id = ?2"
                ),
                params![id, user.as_str()],
                Self::template_from_row,
            )
            .optional()
            .context("Failed to load food template")
    }

    pub fn update_template(
        &self,
        user: &UserId,
        id: i64,
        update: &UpdateFoodTemplate,
    ) -> Result<Option<FoodTemplate>> {
        let rows = self
            .conn
            .execute(
                "UPDATE food_templates SET
                    name = COALESCE(?1, name),
                    calories = COALESCE(?2, calories)
                 WHERE id = ?3 AND user_id = ?4",
                params![
                    update.name.as_deref().map(str::trim),
                    update.calories,
                    id,
                    user.as_str(),
                ],
            )
            .context("Failed to update food template")?;
        if rows == 0 {
            return Ok(None);
        }
        self.get_template(user, id)
    }

    pub fn delete_template(&self, user: &UserId, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM food_templates WHERE id = ?1 AND user_id = ?2",
                params![id, user.as_str()],
            )
            .context("Failed to delete food template")?;
        Ok(rows > 0)
    }

    /// Templates ordered by name, case-insensitively.
    pub fn list_templates(&self, user: &UserId) -> Result<Vec<FoodTemplate>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM food_templates WHERE user_id = ?1
             ORDER BY name COLLATE NOCASE, id"
        ))?;
        let templates = stmt
            .query_map(params![user.as_str()], Self::template_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    // --- API tokens ---

    pub fn insert_token(&self, user: &UserId, token_hash: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO api_tokens (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
                params![token_hash, user.as_str(), now],
            )
            .context("Failed to store API token")?;
        Ok(())
    }

    pub fn user_for_token(&self, token_hash: &str) -> Result<Option<UserId>> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT user_id FROM api_tokens WHERE token_hash = ?1",
                params![token_hash],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up API token")?;
        Ok(id.map(UserId::from))
    }
}

fn upsert_weight_on(conn: &Connection, user: &UserId, entry: &NewWeightLog) -> Result<()> {
    let now = Local::now().to_rfc3339();
    conn.execute(
        "INSERT INTO weight_logs (user_id, date, weight_kg, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id, date) DO UPDATE SET
            weight_kg = excluded.weight_kg,
            updated_at = excluded.updated_at",
        params![
            user.as_str(),
            entry.date.format(DATE_FORMAT).to_string(),
            entry.weight_kg,
            now,
            now,
        ],
    )
    .context("Failed to upsert weight log")?;
    Ok(())
}

fn parse_date(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn db_with_user() -> (Database, UserId) {
        let db = Database::open_in_memory().unwrap();
        let user = UserId::generate();
        db.insert_profile(&user, Some("golfer@example.com")).unwrap();
        (db, user)
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

    fn lunch(date: &str, name: &str, calories: i64) -> NewMeal {
        NewMeal {
            date: d(date),
            meal_type: MealType::Lunch,
            food_name: name.to_string(),
            calories,
        }
    }

    #[test]
    fn test_new_profile_has_defaults_and_nulls() {
        let (db, user) = db_with_user();
        let profile = db.get_profile(&user).unwrap().unwrap();
        assert_eq!(profile.email.as_deref(), Some("golfer@example.com"));
        assert!(profile.start_weight.is_none());
        assert!(profile.target_weight.is_none());
        assert!(profile.start_distance.is_none());
        assert!(profile.start_date.is_none());
        assert_eq!(profile.target_distance, 300);
        assert_eq!(profile.target_calories, 3000);
        assert_eq!(profile.kg_to_yd_ratio, 4.0);
    }

    #[test]
    fn test_missing_profile() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_profile(&UserId::from("nobody")).unwrap().is_none());
    }

    #[test]
    fn test_complete_setup_writes_first_log() {
        let (db, user) = db_with_user();
        let profile = db
            .complete_setup(&user, &setup_request(), d("2026-03-01"))
            .unwrap()
            .unwrap();
        assert_eq!(profile.start_weight, Some(70.0));
        assert_eq!(profile.start_date, Some(d("2026-03-01")));

        let logs = db.list_weights(&user, WeightQuery::All).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].weight_kg, 70.0);

        // A second setup is a no-op.
        let again = db
            .complete_setup(&user, &setup_request(), d("2026-03-02"))
            .unwrap();
        assert!(again.is_none());
        assert_eq!(db.list_weights(&user, WeightQuery::All).unwrap().len(), 1);
    }

    #[test]
    fn test_update_settings_leaves_start_values() {
        let (db, user) = db_with_user();
        db.complete_setup(&user, &setup_request(), d("2026-03-01"))
            .unwrap();
        let update = SettingsUpdate {
            target_weight: Some(85.0),
            target_calories: Some(3200),
            ..Default::default()
        };
        let profile = db.update_settings(&user, &update).unwrap().unwrap();
        assert_eq!(profile.target_weight, Some(85.0));
        assert_eq!(profile.target_calories, 3200);
        assert_eq!(profile.target_distance, 300);
        assert_eq!(profile.start_weight, Some(70.0));
        assert_eq!(profile.start_distance, Some(260));
    }

    #[test]
    fn test_ratio_check_constraint() {
        let (db, user) = db_with_user();
        let update = SettingsUpdate {
            kg_to_yd_ratio: Some(9.0),
            ..Default::default()
        };
        assert!(db.update_settings(&user, &update).is_err());
    }

    #[test]
    fn test_upsert_weight_same_date_keeps_one_row() {
        let (db, user) = db_with_user();
        let first = db
            .upsert_weight(&user, &NewWeightLog { date: d("2026-03-01"), weight_kg: 70.0 })
            .unwrap();
        let second = db
            .upsert_weight(&user, &NewWeightLog { date: d("2026-03-01"), weight_kg: 71.2 })
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.weight_kg, 71.2);
        assert_eq!(db.list_weights(&user, WeightQuery::All).unwrap().len(), 1);
    }

    #[test]
    fn test_list_weights_queries() {
        let (db, user) = db_with_user();
        for (day, w) in [("2026-03-01", 70.0), ("2026-03-03", 71.0), ("2026-03-02", 70.5)] {
            db.upsert_weight(&user, &NewWeightLog { date: d(day), weight_kg: w })
                .unwrap();
        }

        let all = db.list_weights(&user, WeightQuery::All).unwrap();
        let dates: Vec<NaiveDate> = all.iter().map(|l| l.date).collect();
        assert_eq!(dates, vec![d("2026-03-03"), d("2026-03-02"), d("2026-03-01")]);

        let recent = db.list_weights(&user, WeightQuery::Recent(2)).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, d("2026-03-03"));

        let range = db
            .list_weights(
                &user,
                WeightQuery::Range {
                    start: Some(d("2026-03-02")),
                    end: None,
                },
            )
            .unwrap();
        assert_eq!(range.len(), 2);

        let range = db
            .list_weights(
                &user,
                WeightQuery::Range {
                    start: Some(d("2026-03-01")),
                    end: Some(d("2026-03-01")),
                },
            )
            .unwrap();
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn test_weight_rows_are_owner_scoped() {
        let (db, alice) = db_with_user();
        let bob = UserId::generate();
        db.insert_profile(&bob, None).unwrap();

        let log = db
            .upsert_weight(&alice, &NewWeightLog { date: d("2026-03-01"), weight_kg: 70.0 })
            .unwrap();

        assert!(db.get_weight(&bob, log.id).unwrap().is_none());
        assert!(db.update_weight(&bob, log.id, 99.0).unwrap().is_none());
        assert!(!db.delete_weight(&bob, log.id).unwrap());
        assert!(db.list_weights(&bob, WeightQuery::All).unwrap().is_empty());

        let edited = db.update_weight(&alice, log.id, 70.8).unwrap().unwrap();
        assert_eq!(edited.weight_kg, 70.8);
        assert_eq!(edited.date, d("2026-03-01"));
        assert!(db.delete_weight(&alice, log.id).unwrap());
    }

    #[test]
    fn test_meal_crud() {
        let (db, user) = db_with_user();
        let meal = db
            .insert_meal(&user, &lunch("2026-03-01", "  Ramen ", 900))
            .unwrap();
        assert_eq!(meal.food_name, "Ramen");
        assert_eq!(meal.meal_type, MealType::Lunch);

        let update = UpdateMeal {
            meal_type: Some(MealType::Dinner),
            calories: Some(950),
            ..Default::default()
        };
        let updated = db.update_meal(&user, meal.id, &update).unwrap().unwrap();
        assert_eq!(updated.meal_type, MealType::Dinner);
        assert_eq!(updated.calories, 950);
        assert_eq!(updated.food_name, "Ramen");

        assert!(db.delete_meal(&user, meal.id).unwrap());
        assert!(db.get_meal(&user, meal.id).unwrap().is_none());
        assert!(!db.delete_meal(&user, meal.id).unwrap());
    }

    #[test]
    fn test_meals_by_date_and_all() {
        let (db, user) = db_with_user();
        db.insert_meal(&user, &lunch("2026-03-01", "Rice", 300)).unwrap();
        db.insert_meal(&user, &lunch("2026-03-02", "Pasta", 600)).unwrap();
        db.insert_meal(&user, &lunch("2026-03-01", "Soup", 200)).unwrap();

        let day = db.meals_for_date(&user, d("2026-03-01")).unwrap();
        let names: Vec<&str> = day.iter().map(|m| m.food_name.as_str()).collect();
        assert_eq!(names, vec!["Rice", "Soup"]);

        let all = db.all_meals(&user).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].date, d("2026-03-02"));
    }

    #[test]
    fn test_templates_sorted_and_scoped() {
        let (db, user) = db_with_user();
        let other = UserId::generate();
        db.insert_profile(&other, None).unwrap();

        for (name, cal) in [("protein shake", 350), ("Banana", 100), ("Chicken bowl", 700)] {
            db.insert_template(&user, &NewFoodTemplate { name: name.to_string(), calories: cal })
                .unwrap();
        }
        db.insert_template(&other, &NewFoodTemplate { name: "Apple".to_string(), calories: 80 })
            .unwrap();

        let list = db.list_templates(&user).unwrap();
        let names: Vec<&str> = list.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Banana", "Chicken bowl", "protein shake"]);

        let banana = &list[0];
        let renamed = db
            .update_template(
                &user,
                banana.id,
                &UpdateFoodTemplate { name: Some("Big banana".to_string()), calories: None },
            )
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Big banana");
        assert_eq!(renamed.calories, 100);

        assert!(db.update_template(&other, banana.id, &UpdateFoodTemplate::default()).unwrap().is_none());
        assert!(!db.delete_template(&other, banana.id).unwrap());
        assert!(db.delete_template(&user, banana.id).unwrap());
    }

    #[test]
    fn test_tokens() {
        let (db, user) = db_with_user();
        db.insert_token(&user, "abc123").unwrap();
        assert_eq!(db.user_for_token("abc123").unwrap(), Some(user));
        assert!(db.user_for_token("nope").unwrap().is_none());
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d3tr.db");
        let user = UserId::from("u1");
        {
            let db = Database::open(&path).unwrap();
            db.insert_profile(&user, None).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert!(db.get_profile(&user).unwrap().is_some());
    }
}
