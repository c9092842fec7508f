use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    ActivityLevel, CUSTOM_FOOD_CATEGORY, EXPORT_VERSION, ExportData, FoodCatalogItem,
    FoodLogEntry, Gender, ImportSummary, NewCustomFood, NewFoodLogEntry, NewProfile,
    NutritionData, UpdateFoodLogEntry, UserProfile, validate_custom_food, validate_log_entry,
};
use crate::nutrition::{calculate_bmr, calculate_daily_calorie_goal};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

const LOG_COLUMNS: &str = "id, uuid, food_name, quantity, unit, calories, protein, carbs, fat, \
                           fiber, meal_type, notes, source, logged_at, created_at, updated_at";

const CUSTOM_FOOD_COLUMNS: &str = "name, category, calories_per_100g, protein_per_100g, \
                                   carbs_per_100g, fat_per_100g, fiber_per_100g, description";

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

    /// Run `f` in a transaction; any error rolls back everything `f` wrote.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            debug!("migrating database schema to version 1");
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS profile (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    uuid TEXT NOT NULL,
                    name TEXT NOT NULL,
                    height_cm REAL NOT NULL,
                    weight_kg REAL NOT NULL,
                    age INTEGER NOT NULL,
                    gender TEXT NOT NULL,
                    activity_level TEXT NOT NULL,
                    bmr REAL NOT NULL,
                    daily_calorie_goal INTEGER NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS food_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    food_name TEXT NOT NULL,
                    quantity REAL NOT NULL,
                    unit TEXT NOT NULL,
                    calories REAL NOT NULL,
                    protein REAL NOT NULL,
                    carbs REAL NOT NULL,
                    fat REAL NOT NULL,
                    fiber REAL NOT NULL,
                    meal_type TEXT NOT NULL,
                    notes TEXT,
                    source TEXT NOT NULL,
                    log_date TEXT NOT NULL,
                    logged_at TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS custom_foods (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                    category TEXT NOT NULL,
                    calories_per_100g REAL NOT NULL,
                    protein_per_100g REAL NOT NULL,
                    carbs_per_100g REAL NOT NULL,
                    fat_per_100g REAL NOT NULL,
                    fiber_per_100g REAL NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_food_logs_date ON food_logs(log_date);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn parse_text<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let raw: String = row.get(idx)?;
        raw.parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
        let raw: String = row.get(idx)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn profile_from_row(row: &rusqlite::Row) -> rusqlite::Result<UserProfile> {
        let gender: String = row.get(5)?;
        let activity: String = row.get(6)?;
        Ok(UserProfile {
            id: row.get(0)?,
            name: row.get(1)?,
            height_cm: row.get(2)?,
            weight_kg: row.get(3)?,
            age: row.get(4)?,
            gender: Gender::from_label(&gender),
            activity_level: ActivityLevel::from_label(&activity).unwrap_or_default(),
            bmr: row.get(7)?,
            daily_calorie_goal: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    // Column order follows LOG_COLUMNS.
    fn log_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodLogEntry> {
        Ok(FoodLogEntry {
            id: row.get(0)?,
            uuid: row.get(1)?,
            food_name: row.get(2)?,
            quantity: row.get(3)?,
            unit: row.get(4)?,
            nutrition: NutritionData {
                calories: row.get(5)?,
                protein: row.get(6)?,
                carbs: row.get(7)?,
                fat: row.get(8)?,
                fiber: row.get(9)?,
            },
            meal_type: Self::parse_text(row, 10)?,
            notes: row.get(11)?,
            source: Self::parse_text(row, 12)?,
            logged_at: Self::parse_timestamp(row, 13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }

    // Column order follows CUSTOM_FOOD_COLUMNS.
    fn custom_food_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodCatalogItem> {
        Ok(FoodCatalogItem {
            name: row.get(0)?,
            category: row.get(1)?,
            calories_per_100g: row.get(2)?,
            protein_per_100g: row.get(3)?,
            carbs_per_100g: row.get(4)?,
            fat_per_100g: row.get(5)?,
            fiber_per_100g: row.get(6)?,
            description: row.get(7)?,
            is_custom: true,
        })
    }

    // --- Profile ---

    pub fn get_profile(&self) -> Result<Option<UserProfile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT uuid, name, height_cm, weight_kg, age, gender, activity_level,
                        bmr, daily_calorie_goal, created_at, updated_at
                 FROM profile WHERE id = 1",
                [],
                Self::profile_from_row,
            )
            .optional()?;
        Ok(profile)
    }

    /// Create or replace the single profile. BMR and calorie goal are
    /// always recomputed from the supplied metrics.
    pub fn save_profile(&self, profile: &NewProfile) -> Result<UserProfile> {
        let now = Local::now().to_rfc3339();
        let bmr = calculate_bmr(
            profile.weight_kg,
            profile.height_cm,
            profile.age,
            profile.gender,
        );
        let goal = calculate_daily_calorie_goal(bmr, profile.activity_level);
        self.conn.execute(
            "INSERT INTO profile (id, uuid, name, height_cm, weight_kg, age, gender, activity_level,
                                  bmr, daily_calorie_goal, created_at, updated_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                age = excluded.age,
                gender = excluded.gender,
                activity_level = excluded.activity_level,
                bmr = excluded.bmr,
                daily_calorie_goal = excluded.daily_calorie_goal,
                updated_at = excluded.updated_at",
            params![
                Uuid::new_v4().to_string(),
                profile.name,
                profile.height_cm,
                profile.weight_kg,
                profile.age,
                profile.gender.as_str(),
                profile.activity_level.as_str(),
                bmr,
                goal,
                now,
            ],
        )?;
        info!(bmr, goal, "saved profile");
        self.get_profile()?.context("Profile not found after save")
    }

    // --- Food log ---

    pub fn insert_log_entry(&self, entry: &NewFoodLogEntry) -> Result<FoodLogEntry> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO food_logs (uuid, food_name, quantity, unit, calories, protein, carbs, fat,
                                    fiber, meal_type, notes, source, log_date, logged_at,
                                    created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)",
            params![
                uuid,
                entry.food_name.trim(),
                entry.quantity,
                entry.unit.trim(),
                entry.nutrition.calories,
                entry.nutrition.protein,
                entry.nutrition.carbs,
                entry.nutrition.fat,
                entry.nutrition.fiber,
                entry.meal_type.as_str(),
                entry.notes,
                entry.source.as_str(),
                entry.logged_at.format(DATE_FORMAT).to_string(),
                entry.logged_at.format(TIMESTAMP_FORMAT).to_string(),
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, food = %entry.food_name, meal = %entry.meal_type, "logged food");
        self.get_log_entry(id)
    }

    pub fn get_log_entry(&self, id: i64) -> Result<FoodLogEntry> {
        self.conn
            .query_row(
                &format!("SELECT {LOG_COLUMNS} FROM food_logs WHERE id = ?1"),
                params![id],
                Self::log_entry_from_row,
            )
            .context("Food log entry not found")
    }

    pub fn find_log_entry(&self, id: i64) -> Result<Option<FoodLogEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!("SELECT {LOG_COLUMNS} FROM food_logs WHERE id = ?1"),
                params![id],
                Self::log_entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    pub fn delete_log_entry(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM food_logs WHERE id = ?1", params![id])?;
        if rows > 0 {
            info!(id, "deleted food log entry");
        }
        Ok(rows > 0)
    }

    pub fn update_log_entry(&self, id: i64, update: &UpdateFoodLogEntry) -> Result<FoodLogEntry> {
        let current = self.get_log_entry(id)?;
        if update.is_empty() {
            return Ok(current);
        }

        let quantity = update.quantity.unwrap_or(current.quantity);
        if !(quantity.is_finite() && quantity > 0.0) {
            bail!("Quantity must be greater than 0");
        }
        let unit = update.unit.clone().unwrap_or(current.unit);
        let meal_type = update.meal_type.unwrap_or(current.meal_type);
        let logged_at = update.logged_at.unwrap_or(current.logged_at);
        let notes = update.notes.clone().unwrap_or(current.notes);
        let n = update.nutrition.unwrap_or(current.nutrition);
        if !n.is_valid() {
            bail!("Nutrition values must be non-negative numbers");
        }

        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "UPDATE food_logs SET quantity = ?1, unit = ?2, calories = ?3, protein = ?4,
                    carbs = ?5, fat = ?6, fiber = ?7, meal_type = ?8, notes = ?9,
                    log_date = ?10, logged_at = ?11, updated_at = ?12
             WHERE id = ?13",
            params![
                quantity,
                unit,
                n.calories,
                n.protein,
                n.carbs,
                n.fat,
                n.fiber,
                meal_type.as_str(),
                notes,
                logged_at.format(DATE_FORMAT).to_string(),
                logged_at.format(TIMESTAMP_FORMAT).to_string(),
                now,
                id,
            ],
        )?;
        info!(id, "updated food log entry");
        self.get_log_entry(id)
    }

    pub fn get_entries_for_date(&self, date: NaiveDate) -> Result<Vec<FoodLogEntry>> {
        self.get_entries_between(date, date)
    }

    /// Entries logged from `start` through `end`, both inclusive.
    pub fn get_entries_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<FoodLogEntry>> {
        let start_str = start.format(DATE_FORMAT).to_string();
        let end_str = end.format(DATE_FORMAT).to_string();
        debug!(%start, %end, "querying food log");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM food_logs
             WHERE log_date >= ?1 AND log_date <= ?2
             ORDER BY logged_at, id"
        ))?;
        let entries = stmt
            .query_map(params![start_str, end_str], Self::log_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get_all_entries(&self) -> Result<Vec<FoodLogEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM food_logs ORDER BY logged_at, id"
        ))?;
        let entries = stmt
            .query_map([], Self::log_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Consecutive days with at least one entry, ending today or yesterday.
    pub fn get_logging_streak(&self, today: NaiveDate) -> Result<i64> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT log_date FROM food_logs WHERE log_date <= ?1 ORDER BY log_date DESC",
        )?;
        let dates: Vec<String> = stmt
            .query_map(params![today.format(DATE_FORMAT).to_string()], |row| {
                row.get(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let yesterday = today - chrono::Duration::days(1);
        let start_date = match dates.first() {
            Some(d) if *d == today.format(DATE_FORMAT).to_string() => today,
            Some(d) if *d == yesterday.format(DATE_FORMAT).to_string() => yesterday,
            _ => return Ok(0),
        };

        let mut streak: i64 = 0;
        for date_str in &dates {
            let expected = (start_date - chrono::Duration::days(streak))
                .format(DATE_FORMAT)
                .to_string();
            if *date_str != expected {
                break;
            }
            streak += 1;
        }
        Ok(streak)
    }

    // --- Custom foods ---

    pub fn insert_custom_food(&self, food: &NewCustomFood) -> Result<FoodCatalogItem> {
        let name = food.name.trim();
        if self.find_custom_food(name)?.is_some() {
            bail!("A custom food named '{name}' already exists");
        }
        let now = Local::now().to_rfc3339();
        let category = food
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(CUSTOM_FOOD_CATEGORY);
        let n = &food.per_100g;
        self.conn.execute(
            &format!(
                "INSERT INTO custom_foods ({CUSTOM_FOOD_COLUMNS}, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                name,
                category,
                n.calories,
                n.protein,
                n.carbs,
                n.fat,
                n.fiber,
                food.description.as_deref().unwrap_or_default(),
                now,
            ],
        )?;
        info!(food = name, category, "added custom food");
        self.find_custom_food(name)?
            .context("Custom food not found after insert")
    }

    /// Case-insensitive exact name lookup.
    pub fn find_custom_food(&self, name: &str) -> Result<Option<FoodCatalogItem>> {
        let food = self
            .conn
            .query_row(
                &format!("SELECT {CUSTOM_FOOD_COLUMNS} FROM custom_foods WHERE name = ?1"),
                params![name.trim()],
                Self::custom_food_from_row,
            )
            .optional()?;
        Ok(food)
    }

    pub fn list_custom_foods(&self, search: Option<&str>) -> Result<Vec<FoodCatalogItem>> {
        let foods = if let Some(query) = search {
            let escaped = query
                .trim()
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            let pattern = format!("%{escaped}%");
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {CUSTOM_FOOD_COLUMNS} FROM custom_foods
                 WHERE name LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\'
                 ORDER BY name"
            ))?;
            stmt.query_map(params![pattern], Self::custom_food_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {CUSTOM_FOOD_COLUMNS} FROM custom_foods ORDER BY name"
            ))?;
            stmt.query_map([], Self::custom_food_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(foods)
    }

    // --- Export / Import ---

    pub fn export_all(&self) -> Result<ExportData> {
        Ok(ExportData {
            version: EXPORT_VERSION,
            exported_at: Local::now().to_rfc3339(),
            profile: self.get_profile()?,
            entries: self.get_all_entries()?,
            custom_foods: self.list_custom_foods(None)?,
        })
    }

    /// Merge an export into this database. Existing rows win: entries are
    /// matched on uuid, custom foods on name, and a local profile is never
    /// overwritten.
    pub fn import_all(&self, data: &ExportData) -> Result<ImportSummary> {
        if data.version != EXPORT_VERSION {
            bail!(
                "Unsupported export version {} (expected {EXPORT_VERSION})",
                data.version
            );
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut summary = ImportSummary::default();

        if let Some(profile) = &data.profile {
            let metrics = profile.metrics();
            if let Err(e) = metrics.validate() {
                warn!(error = %e, "skipping invalid imported profile");
                summary.rows_rejected += 1;
            } else if self.get_profile()?.is_none() {
                self.save_profile(&metrics)?;
                summary.profile_imported = true;
            }
        }

        let now = Local::now().to_rfc3339();
        for entry in &data.entries {
            if let Err(e) = validate_log_entry(&entry.to_new()) {
                warn!(uuid = %entry.uuid, error = %e, "skipping invalid imported entry");
                summary.rows_rejected += 1;
                continue;
            }
            let rows = self.conn.execute(
                "INSERT OR IGNORE INTO food_logs (uuid, food_name, quantity, unit, calories, protein,
                        carbs, fat, fiber, meal_type, notes, source, log_date, logged_at,
                        created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    entry.uuid,
                    entry.food_name,
                    entry.quantity,
                    entry.unit,
                    entry.nutrition.calories,
                    entry.nutrition.protein,
                    entry.nutrition.carbs,
                    entry.nutrition.fat,
                    entry.nutrition.fiber,
                    entry.meal_type.as_str(),
                    entry.notes,
                    entry.source.as_str(),
                    entry.logged_at.format(DATE_FORMAT).to_string(),
                    entry.logged_at.format(TIMESTAMP_FORMAT).to_string(),
                    entry.created_at,
                    if entry.updated_at.is_empty() {
                        &now
                    } else {
                        &entry.updated_at
                    },
                ],
            )?;
            if rows > 0 {
                summary.entries_imported += 1;
            } else {
                summary.entries_skipped += 1;
            }
        }

        for food in &data.custom_foods {
            if let Err(e) = validate_custom_food(&food.to_new()) {
                warn!(food = %food.name, error = %e, "skipping invalid imported food");
                summary.rows_rejected += 1;
                continue;
            }
            let rows = self.conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO custom_foods ({CUSTOM_FOOD_COLUMNS}, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    food.name,
                    food.category,
                    food.calories_per_100g,
                    food.protein_per_100g,
                    food.carbs_per_100g,
                    food.fat_per_100g,
                    food.fiber_per_100g,
                    food.description,
                    now,
                ],
            )?;
            if rows > 0 {
                summary.custom_foods_imported += 1;
            } else {
                summary.custom_foods_skipped += 1;
            }
        }

        tx.commit()?;
        info!(
            entries = summary.entries_imported,
            skipped = summary.entries_skipped,
            foods = summary.custom_foods_imported,
            "imported data"
        );
        Ok(summary)
    }
}
