use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use tracing::info;

use crate::catalog::{FoodCatalog, StaticCatalog};
use crate::db::Database;
use crate::food_import::{self, FoodImportSummary};
use crate::models::{
    DailySummary, EntrySource, ExportData, FoodCatalogItem, FoodLogEntry, ImportSummary,
    InputError, MealType, NewCustomFood, NewFoodLogEntry, NewProfile, NutritionData,
    NutritionEstimate, ScanResult, UpdateFoodLogEntry, UpdateProfile, UserProfile, WeeklySummary,
    validate_custom_food, validate_log_entry,
};
use crate::nutrition;
use crate::recognition::{self, FoodRecognizer};
use crate::reminders::{self, Reminder, ReminderScheduler};

/// Log a food by name; nutrition comes from the catalog or the heuristic.
#[derive(Debug, Clone)]
pub struct LogFoodRequest {
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    /// Derived from the hour of `logged_at` when absent.
    pub meal_type: Option<MealType>,
    pub logged_at: NaiveDateTime,
    pub notes: Option<String>,
}

/// Log a food with user-supplied nutrition for a portion of `portion_g` grams.
#[derive(Debug, Clone)]
pub struct ManualEntryRequest {
    pub food_name: String,
    pub portion_g: f64,
    pub nutrition: NutritionData,
    pub meal_type: Option<MealType>,
    pub logged_at: NaiveDateTime,
    pub notes: Option<String>,
    /// Also store the food, scaled to per-100g, for later lookups.
    pub save_as_custom_food: bool,
}

pub struct ThaliService {
    db: Database,
    catalog: Box<dyn FoodCatalog>,
}

impl ThaliService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self::with_catalog(db, Box::new(StaticCatalog::new())))
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self::with_catalog(db, Box::new(StaticCatalog::new())))
    }

    #[must_use]
    pub fn with_catalog(db: Database, catalog: Box<dyn FoodCatalog>) -> Self {
        Self { db, catalog }
    }

    // --- Profile ---

    pub fn get_profile(&self) -> Result<Option<UserProfile>> {
        self.db.get_profile()
    }

    pub fn setup_profile(&self, profile: &NewProfile) -> Result<UserProfile> {
        if self.db.get_profile()?.is_some() {
            bail!("A profile already exists; update it instead");
        }
        profile.validate()?;
        self.db.save_profile(profile)
    }

    pub fn update_profile(&self, update: &UpdateProfile) -> Result<UserProfile> {
        let current = self
            .db
            .get_profile()?
            .context("No profile found; run profile setup first")?;
        let merged = update.apply_to(current.metrics());
        merged.validate()?;
        self.db.save_profile(&merged)
    }

    // --- Catalog ---

    /// Custom foods shadow built-in items with the same name.
    pub fn find_food(&self, name: &str) -> Result<Option<FoodCatalogItem>> {
        if let Some(food) = self.db.find_custom_food(name)? {
            return Ok(Some(food));
        }
        Ok(self.catalog.find(name))
    }

    pub fn list_foods(&self, category: Option<&str>) -> Result<Vec<FoodCatalogItem>> {
        let mut foods = self.db.list_custom_foods(None)?;
        foods.extend(self.catalog.all());
        if let Some(category) = category {
            foods.retain(|f| f.category.eq_ignore_ascii_case(category.trim()));
        }
        Ok(foods)
    }

    pub fn search_foods(&self, query: &str) -> Result<Vec<FoodCatalogItem>> {
        let mut foods = self.db.list_custom_foods(Some(query))?;
        foods.extend(self.catalog.search(query));
        Ok(foods)
    }

    pub fn food_categories(&self) -> Result<Vec<String>> {
        let mut categories = self.catalog.categories();
        categories.extend(self.db.list_custom_foods(None)?.into_iter().map(|f| f.category));
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    pub fn add_custom_food(&self, food: &NewCustomFood) -> Result<FoodCatalogItem> {
        validate_custom_food(food)?;
        if self.catalog.find(&food.name).is_some() {
            bail!("'{}' is already a built-in food", food.name.trim());
        }
        self.db.insert_custom_food(food)
    }

    pub fn import_custom_foods_csv(&self, csv_data: &str, dry_run: bool) -> Result<FoodImportSummary> {
        let rows = food_import::parse_food_csv(csv_data.as_bytes())?;
        food_import::import_custom_foods(&self.db, self.catalog.as_ref(), &rows, dry_run)
    }

    #[must_use]
    pub fn suggest_food_names(&self, query: &str) -> Vec<String> {
        recognition::suggest_food_names(self.catalog.as_ref(), query)
    }

    // --- Estimation ---

    pub fn estimate_nutrition(&self, name: &str, quantity: f64, unit: &str) -> Result<NutritionEstimate> {
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(InputError::NotPositive { field: "quantity" }.into());
        }
        Ok(match self.find_food(name)? {
            Some(item) => nutrition::estimate_nutrition_for_quantity(&item, quantity, unit),
            None => nutrition::estimate_nutrition_for_unknown_food(name.trim(), quantity, unit),
        })
    }

    // --- Logging ---

    pub fn log_food(&self, request: &LogFoodRequest) -> Result<FoodLogEntry> {
        self.log_food_with_estimate(request).map(|(entry, _)| entry)
    }

    /// [`Self::log_food`], also returning the estimate the entry was built from.
    pub fn log_food_with_estimate(
        &self,
        request: &LogFoodRequest,
    ) -> Result<(FoodLogEntry, NutritionEstimate)> {
        let estimate = self.estimate_nutrition(&request.food_name, request.quantity, &request.unit)?;
        let entry = NewFoodLogEntry {
            food_name: estimate.food_name.clone(),
            quantity: request.quantity,
            unit: request.unit.clone(),
            nutrition: estimate.nutrition,
            meal_type: resolve_meal(request.meal_type, request.logged_at),
            notes: request.notes.clone(),
            source: estimate.entry_source(),
            logged_at: request.logged_at,
        };
        validate_log_entry(&entry)?;
        let logged = self.db.insert_log_entry(&entry)?;
        Ok((logged, estimate))
    }

    pub fn log_manual(&self, request: &ManualEntryRequest) -> Result<FoodLogEntry> {
        let entry = NewFoodLogEntry {
            food_name: request.food_name.trim().to_string(),
            quantity: request.portion_g,
            unit: "g".to_string(),
            nutrition: request.nutrition,
            meal_type: resolve_meal(request.meal_type, request.logged_at),
            notes: request.notes.clone(),
            source: EntrySource::Manual,
            logged_at: request.logged_at,
        };
        validate_log_entry(&entry)?;

        let custom_food = if request.save_as_custom_food {
            if self.find_food(&entry.food_name)?.is_some() {
                info!(food = %entry.food_name, "food already known, not saving a custom copy");
                None
            } else {
                let food = NewCustomFood {
                    name: entry.food_name.clone(),
                    category: None,
                    per_100g: request.nutrition.scaled(100.0 / request.portion_g),
                    description: None,
                };
                validate_custom_food(&food)?;
                Some(food)
            }
        } else {
            None
        };

        // The entry and its saved food are written together or not at all.
        self.db.in_transaction(|db| {
            let logged = db.insert_log_entry(&entry)?;
            if let Some(food) = &custom_food {
                db.insert_custom_food(food)?;
            }
            Ok(logged)
        })
    }

    pub fn scan(&self, recognizer: &mut dyn FoodRecognizer) -> Result<ScanResult> {
        recognizer.recognize(self.catalog.as_ref())
    }

    pub fn log_scan(
        &self,
        scan: &ScanResult,
        quantity: f64,
        unit: &str,
        meal_type: Option<MealType>,
        logged_at: NaiveDateTime,
    ) -> Result<FoodLogEntry> {
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(InputError::NotPositive { field: "quantity" }.into());
        }
        let estimate = nutrition::estimate_nutrition_for_quantity(&scan.item, quantity, unit);
        let entry = NewFoodLogEntry {
            food_name: scan.item.name.clone(),
            quantity,
            unit: unit.to_string(),
            nutrition: estimate.nutrition,
            meal_type: resolve_meal(meal_type, logged_at),
            notes: None,
            source: EntrySource::Scan,
            logged_at,
        };
        validate_log_entry(&entry)?;
        self.db.insert_log_entry(&entry)
    }

    pub fn get_entry(&self, id: i64) -> Result<Option<FoodLogEntry>> {
        self.db.find_log_entry(id)
    }

    /// Apply an edit. A quantity or unit change without explicit nutrition
    /// recomputes the nutrition for the new portion.
    pub fn update_entry(&self, id: i64, update: &UpdateFoodLogEntry) -> Result<FoodLogEntry> {
        let current = self.db.get_log_entry(id)?;
        let mut update = update.clone();

        if update.nutrition.is_none() && update.changes_portion() {
            let quantity = update.quantity.unwrap_or(current.quantity);
            if !(quantity.is_finite() && quantity > 0.0) {
                return Err(InputError::NotPositive { field: "quantity" }.into());
            }
            let unit = update.unit.clone().unwrap_or_else(|| current.unit.clone());
            let same_unit = unit.trim().eq_ignore_ascii_case(current.unit.trim());
            let nutrition = if current.source == EntrySource::Manual && same_unit {
                current
                    .nutrition
                    .scaled(quantity / current.quantity)
                    .rounded()
            } else {
                self.estimate_nutrition(&current.food_name, quantity, &unit)?
                    .nutrition
            };
            update.nutrition = Some(nutrition);
        }

        self.db.update_log_entry(id, &update)
    }

    pub fn delete_entry(&self, id: i64) -> Result<bool> {
        self.db.delete_log_entry(id)
    }

    // --- Summaries ---

    fn calorie_goal(&self) -> Result<Option<i64>> {
        Ok(self.db.get_profile()?.map(|p| p.daily_calorie_goal))
    }

    pub fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary> {
        let entries = self.db.get_entries_for_date(date)?;
        Ok(nutrition::daily_summary_with_goal(
            &entries,
            date,
            self.calorie_goal()?,
        ))
    }

    pub fn weekly_summary(&self, start: NaiveDate) -> Result<WeeklySummary> {
        let entries = self
            .db
            .get_entries_between(start, start + Duration::days(6))?;
        Ok(nutrition::aggregate_weekly(
            &entries,
            start,
            self.calorie_goal()?,
        ))
    }

    pub fn logging_streak(&self, today: NaiveDate) -> Result<i64> {
        self.db.get_logging_streak(today)
    }

    // --- Reminders ---

    /// Replace all pending reminders with the daily meal reminders.
    pub fn enable_reminders(
        &self,
        scheduler: &mut dyn ReminderScheduler,
        with_motivation: bool,
    ) -> Result<Vec<Reminder>> {
        scheduler.cancel_all()?;
        for reminder in reminders::default_meal_reminders() {
            scheduler.schedule(reminder)?;
        }
        if with_motivation {
            scheduler.schedule(reminders::motivational_reminder(&mut rand::rng()))?;
        }
        scheduler.pending()
    }

    pub fn disable_reminders(&self, scheduler: &mut dyn ReminderScheduler) -> Result<()> {
        scheduler.cancel_all()
    }

    /// Schedule a goal notification for `date` when calories are at or near the goal.
    pub fn check_goal(
        &self,
        date: NaiveDate,
        scheduler: &mut dyn ReminderScheduler,
    ) -> Result<Option<Reminder>> {
        let summary = self.daily_summary(date)?;
        let Some(progress) = summary.progress else {
            return Ok(None);
        };
        let Some(reminder) = reminders::calorie_goal_check(&progress) else {
            return Ok(None);
        };
        scheduler.schedule(reminder.clone())?;
        Ok(Some(reminder))
    }

    // --- Export / Import ---

    pub fn export_all(&self) -> Result<ExportData> {
        self.db.export_all()
    }

    /// Merge an export. Custom foods named like a built-in item are skipped
    /// so they cannot shadow the catalog.
    pub fn import_all(&self, data: &ExportData) -> Result<ImportSummary> {
        let mut data = data.clone();
        let before = data.custom_foods.len();
        data.custom_foods
            .retain(|f| self.catalog.find(&f.name).is_none());
        let shadowing = before - data.custom_foods.len();

        let mut summary = self.db.import_all(&data)?;
        summary.custom_foods_skipped += i64::try_from(shadowing)?;
        Ok(summary)
    }
}

fn resolve_meal(meal_type: Option<MealType>, logged_at: NaiveDateTime) -> MealType {
    meal_type.unwrap_or_else(|| MealType::for_hour(logged_at.hour()))
}
