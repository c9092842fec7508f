use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected user input. Interactive callers re-prompt on this error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{field}: '{value}' is not a number")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },
    #[error("{field}: '{value}' is not a whole number")]
    NotWholeNumber { field: &'static str, value: String },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u32 },
    #[error("Invalid {field} '{value}'. Must be one of: {allowed}")]
    UnknownChoice {
        field: &'static str,
        value: String,
        allowed: String,
    },
}

/// Parse a user-supplied string as a finite number in `(0, MAX_NUTRIENT_VALUE]`.
pub fn parse_positive(field: &'static str, raw: &str) -> Result<f64, InputError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed.parse().map_err(|_| InputError::NotANumber {
        field,
        value: trimmed.to_string(),
    })?;
    if !value.is_finite() {
        return Err(InputError::NotANumber {
            field,
            value: trimmed.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(InputError::NotPositive { field });
    }
    if value > MAX_NUTRIENT_VALUE {
        return Err(InputError::TooLarge {
            field,
            max: MAX_NUTRIENT_WHOLE,
        });
    }
    Ok(value)
}

/// Parse an optional non-negative amount; blank input counts as zero.
pub fn parse_amount_or_zero(field: &'static str, raw: Option<&str>) -> Result<f64, InputError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(0.0),
        Some(s) => {
            let value: f64 = s.parse().map_err(|_| InputError::NotANumber {
                field,
                value: s.to_string(),
            })?;
            if !value.is_finite() || value < 0.0 {
                return Err(InputError::NotANumber {
                    field,
                    value: s.to_string(),
                });
            }
            if value > MAX_NUTRIENT_VALUE {
                return Err(InputError::TooLarge {
                    field,
                    max: MAX_NUTRIENT_WHOLE,
                });
            }
            Ok(value)
        }
    }
}

pub fn parse_positive_whole(field: &'static str, raw: &str) -> Result<u32, InputError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed.parse().map_err(|_| InputError::NotWholeNumber {
        field,
        value: trimmed.to_string(),
    })?;
    if value <= 0 {
        return Err(InputError::NotPositive { field });
    }
    u32::try_from(value).map_err(|_| InputError::NotWholeNumber {
        field,
        value: trimmed.to_string(),
    })
}

// --- Enumerations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Anything that is not recognisably male or female maps to `Other`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "male" | "m" | "man" => Gender::Male,
            "female" | "f" | "woman" => Gender::Female,
            _ => Gender::Other,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    #[default]
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalized.as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "veryactive" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }

    /// Total-daily-energy-expenditure factor applied to BMR.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very active",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little to no exercise",
            ActivityLevel::Light => "Light exercise 1-3 days/week",
            ActivityLevel::Moderate => "Moderate exercise 3-5 days/week",
            ActivityLevel::Active => "Heavy exercise 6-7 days/week",
            ActivityLevel::VeryActive => "Very heavy exercise, physical job",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityLevel {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityLevel::from_label(s).ok_or_else(|| InputError::UnknownChoice {
            field: "activity level",
            value: s.to_string(),
            allowed: ActivityLevel::ALL
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

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

    /// Meal a log entry defaults to when the user does not pick one.
    #[must_use]
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            5..=10 => MealType::Breakfast,
            11..=15 => MealType::Lunch,
            16..=19 => MealType::Dinner,
            _ => MealType::Snack,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        MealType::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| InputError::UnknownChoice {
                field: "meal type",
                value: s.to_string(),
                allowed: MealType::ALL
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Where the nutrition figures of a log entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    Catalog,
    Estimate,
    Manual,
    Scan,
}

impl EntrySource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntrySource::Catalog => "catalog",
            EntrySource::Estimate => "estimate",
            EntrySource::Manual => "manual",
            EntrySource::Scan => "scan",
        }
    }
}

impl FromStr for EntrySource {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalog" => Ok(EntrySource::Catalog),
            "estimate" => Ok(EntrySource::Estimate),
            "manual" => Ok(EntrySource::Manual),
            "scan" => Ok(EntrySource::Scan),
            _ => Err(InputError::UnknownChoice {
                field: "entry source",
                value: s.to_string(),
                allowed: "catalog, estimate, manual, scan".to_string(),
            }),
        }
    }
}

// --- Nutrition values ---

const MAX_NUTRIENT_WHOLE: u32 = 100_000;

/// Upper bound for any single nutrient value on one entry or food.
#[allow(clippy::cast_lossless)]
pub const MAX_NUTRIENT_VALUE: f64 = MAX_NUTRIENT_WHOLE as f64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionData {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl NutritionData {
    pub const ZERO: NutritionData = NutritionData {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
        fiber: 0.0,
    };

    #[must_use]
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64, fiber: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            fiber,
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
            fiber: self.fiber * factor,
        }
    }

    /// Whole kilocalories and macros to one decimal place.
    #[must_use]
    pub fn rounded(&self) -> Self {
        let tenth = |v: f64| (v * 10.0).round() / 10.0;
        Self {
            calories: self.calories.round(),
            protein: tenth(self.protein),
            carbs: tenth(self.carbs),
            fat: tenth(self.fat),
            fiber: tenth(self.fiber),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.check("nutrition").is_ok()
    }

    /// Every value must be a finite number in `0..=MAX_NUTRIENT_VALUE`.
    pub fn check(&self, field: &'static str) -> Result<(), InputError> {
        let values = [self.calories, self.protein, self.carbs, self.fat, self.fiber];
        if !values.iter().all(|v| v.is_finite() && *v >= 0.0) {
            return Err(InputError::NotANumber {
                field,
                value: format!("{self:?}"),
            });
        }
        if values.iter().any(|v| *v > MAX_NUTRIENT_VALUE) {
            return Err(InputError::TooLarge {
                field,
                max: MAX_NUTRIENT_WHOLE,
            });
        }
        Ok(())
    }
}

// --- Profile ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    /// Derived from the body metrics; never edited directly.
    pub bmr: f64,
    /// Derived: `round(bmr * activity multiplier)`.
    pub daily_calorie_goal: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl UserProfile {
    #[must_use]
    pub fn metrics(&self) -> NewProfile {
        NewProfile {
            name: self.name.clone(),
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            age: self.age,
            gender: self.gender,
            activity_level: self.activity_level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub name: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl NewProfile {
    pub fn validate(&self) -> Result<(), InputError> {
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(InputError::NotPositive { field: "height" });
        }
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(InputError::NotPositive { field: "weight" });
        }
        if self.age == 0 {
            return Err(InputError::NotPositive { field: "age" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
}

impl UpdateProfile {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.height_cm.is_none()
            && self.weight_kg.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.activity_level.is_none()
    }

    #[must_use]
    pub fn apply_to(&self, current: NewProfile) -> NewProfile {
        NewProfile {
            name: self.name.clone().unwrap_or(current.name),
            height_cm: self.height_cm.unwrap_or(current.height_cm),
            weight_kg: self.weight_kg.unwrap_or(current.weight_kg),
            age: self.age.unwrap_or(current.age),
            gender: self.gender.unwrap_or(current.gender),
            activity_level: self.activity_level.unwrap_or(current.activity_level),
        }
    }
}

// --- Food log ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogEntry {
    pub id: i64,
    pub uuid: String,
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(flatten)]
    pub nutrition: NutritionData,
    pub meal_type: MealType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    pub source: EntrySource,
    pub logged_at: NaiveDateTime,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl FoodLogEntry {
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.logged_at.date()
    }

    #[must_use]
    pub fn to_new(&self) -> NewFoodLogEntry {
        NewFoodLogEntry {
            food_name: self.food_name.clone(),
            quantity: self.quantity,
            unit: self.unit.clone(),
            nutrition: self.nutrition,
            meal_type: self.meal_type,
            notes: self.notes.clone(),
            source: self.source,
            logged_at: self.logged_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewFoodLogEntry {
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    pub nutrition: NutritionData,
    pub meal_type: MealType,
    pub notes: Option<String>,
    pub source: EntrySource,
    pub logged_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateFoodLogEntry {
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub meal_type: Option<MealType>,
    pub logged_at: Option<NaiveDateTime>,
    pub notes: Option<Option<String>>,
    pub nutrition: Option<NutritionData>,
}

impl UpdateFoodLogEntry {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none()
            && self.unit.is_none()
            && self.meal_type.is_none()
            && self.logged_at.is_none()
            && self.notes.is_none()
            && self.nutrition.is_none()
    }

    #[must_use]
    pub fn changes_portion(&self) -> bool {
        self.quantity.is_some() || self.unit.is_some()
    }
}

pub fn validate_log_entry(entry: &NewFoodLogEntry) -> Result<(), InputError> {
    if entry.food_name.trim().is_empty() {
        return Err(InputError::Empty { field: "food name" });
    }
    if !(entry.quantity.is_finite() && entry.quantity > 0.0) {
        return Err(InputError::NotPositive { field: "quantity" });
    }
    if entry.unit.trim().is_empty() {
        return Err(InputError::Empty { field: "unit" });
    }
    entry.nutrition.check("nutrition")
}

// --- Catalog ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCatalogItem {
    pub name: String,
    pub category: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    pub fiber_per_100g: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_custom: bool,
}

impl FoodCatalogItem {
    #[must_use]
    pub fn to_new(&self) -> NewCustomFood {
        NewCustomFood {
            name: self.name.clone(),
            category: Some(self.category.clone()),
            per_100g: self.per_100g(),
            description: Some(self.description.clone()),
        }
    }

    #[must_use]
    pub fn per_100g(&self) -> NutritionData {
        NutritionData::new(
            self.calories_per_100g,
            self.protein_per_100g,
            self.carbs_per_100g,
            self.fat_per_100g,
            self.fiber_per_100g,
        )
    }
}

pub const CUSTOM_FOOD_CATEGORY: &str = "User Added";

#[derive(Debug, Clone)]
pub struct NewCustomFood {
    pub name: String,
    pub category: Option<String>,
    pub per_100g: NutritionData,
    pub description: Option<String>,
}

pub fn validate_custom_food(food: &NewCustomFood) -> Result<(), InputError> {
    if food.name.trim().is_empty() {
        return Err(InputError::Empty { field: "food name" });
    }
    food.per_100g.check("nutrition per 100g")
}

// --- Estimates and scans ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EstimateSource {
    /// Exact name match against the catalog.
    Catalog { category: String, custom: bool },
    /// Keyword guess; not a recognition result.
    Heuristic { category: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct NutritionEstimate {
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    pub nutrition: NutritionData,
    pub source: EstimateSource,
    /// True when the unit was not recognised and a 1x portion was assumed.
    pub assumed_portion: bool,
}

impl NutritionEstimate {
    #[must_use]
    pub fn entry_source(&self) -> EntrySource {
        match self.source {
            EstimateSource::Catalog { .. } => EntrySource::Catalog,
            EstimateSource::Heuristic { .. } => EntrySource::Estimate,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub item: FoodCatalogItem,
    pub confidence: f64,
    pub suggestions: Vec<String>,
    /// Always true: the scanner does not inspect images.
    pub is_guess: bool,
}

// --- Summaries ---

#[derive(Debug, Clone, Serialize)]
pub struct MealBreakdown {
    pub meal_type: MealType,
    pub entries: Vec<FoodLogEntry>,
    pub subtotal: NutritionData,
}

pub const PROTEIN_CALORIE_SHARE: f64 = 0.175;
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const DAILY_FIBER_GOAL_G: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyGoals {
    pub calories: i64,
    pub protein_g: f64,
    pub fiber_g: f64,
}

impl DailyGoals {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_calorie_goal(calories: i64) -> Self {
        Self {
            calories,
            protein_g: calories as f64 * PROTEIN_CALORIE_SHARE / KCAL_PER_GRAM_PROTEIN,
            fiber_g: DAILY_FIBER_GOAL_G,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goals: DailyGoals,
    pub calorie_progress: f64,
    pub protein_progress: f64,
    pub fiber_progress: f64,
    pub calories_remaining: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub totals: NutritionData,
    pub meals: Vec<MealBreakdown>,
    pub entry_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<GoalProgress>,
}

impl DailySummary {
    #[must_use]
    pub fn meal(&self, meal_type: MealType) -> Option<&MealBreakdown> {
        self.meals.iter().find(|m| m.meal_type == meal_type)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DailySummary>,
    pub totals: NutritionData,
    pub logged_days: usize,
    pub average_daily_calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_goal_met: Option<usize>,
}

// --- Export / Import ---

pub const EXPORT_VERSION: i64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub version: i64,
    pub exported_at: String,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub entries: Vec<FoodLogEntry>,
    #[serde(default)]
    pub custom_foods: Vec<FoodCatalogItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub profile_imported: bool,
    pub entries_imported: i64,
    pub entries_skipped: i64,
    pub custom_foods_imported: i64,
    pub custom_foods_skipped: i64,
    /// Profile, entries or foods dropped because their values are invalid.
    #[serde(default)]
    pub rows_rejected: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert!((parse_positive("weight", "70").unwrap() - 70.0).abs() < f64::EPSILON);
        assert!((parse_positive("weight", " 72.5 ").unwrap() - 72.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_positive_rejects_garbage() {
        assert!(matches!(
            parse_positive("weight", "seventy"),
            Err(InputError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_positive("weight", ""),
            Err(InputError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_positive("weight", "NaN"),
            Err(InputError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_parse_positive_rejects_zero_and_negative() {
        assert_eq!(
            parse_positive("height", "0"),
            Err(InputError::NotPositive { field: "height" })
        );
        assert_eq!(
            parse_positive("height", "-170"),
            Err(InputError::NotPositive { field: "height" })
        );
    }

    #[test]
    fn test_parse_rejects_huge_values() {
        assert_eq!(
            parse_positive("quantity", "1e300"),
            Err(InputError::TooLarge {
                field: "quantity",
                max: 100_000
            })
        );
        assert!(parse_positive("quantity", "100000").is_ok());
        assert!(matches!(
            parse_amount_or_zero("calories", Some("1e300")),
            Err(InputError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_parse_positive_whole() {
        assert_eq!(parse_positive_whole("age", "25").unwrap(), 25);
        assert!(parse_positive_whole("age", "25.5").is_err());
        assert!(parse_positive_whole("age", "0").is_err());
        assert!(parse_positive_whole("age", "-3").is_err());
    }

    #[test]
    fn test_parse_amount_or_zero() {
        assert!((parse_amount_or_zero("fiber", None).unwrap()).abs() < f64::EPSILON);
        assert!((parse_amount_or_zero("fiber", Some("  ")).unwrap()).abs() < f64::EPSILON);
        assert!((parse_amount_or_zero("fiber", Some("2.5")).unwrap() - 2.5).abs() < f64::EPSILON);
        assert!(parse_amount_or_zero("fiber", Some("-1")).is_err());
        assert!(parse_amount_or_zero("fiber", Some("lots")).is_err());
    }

    #[test]
    fn test_gender_from_label() {
        assert_eq!(Gender::from_label("Male"), Gender::Male);
        assert_eq!(Gender::from_label("FEMALE"), Gender::Female);
        assert_eq!(Gender::from_label("non-binary"), Gender::Other);
        assert_eq!(Gender::from_label(""), Gender::Other);
    }

    #[test]
    fn test_activity_level_labels() {
        assert_eq!(
            ActivityLevel::from_label("Very Active"),
            Some(ActivityLevel::VeryActive)
        );
        assert_eq!(
            ActivityLevel::from_label("very_active"),
            Some(ActivityLevel::VeryActive)
        );
        assert_eq!(
            ActivityLevel::from_label("Sedentary"),
            Some(ActivityLevel::Sedentary)
        );
        assert_eq!(ActivityLevel::from_label("couch"), None);
        assert!("couch".parse::<ActivityLevel>().is_err());
        assert_eq!(ActivityLevel::default(), ActivityLevel::Light);
    }

    #[test]
    fn test_meal_type_parse_case_insensitive() {
        assert_eq!("Lunch".parse::<MealType>().unwrap(), MealType::Lunch);
        assert_eq!("BREAKFAST".parse::<MealType>().unwrap(), MealType::Breakfast);
        assert!("brunch".parse::<MealType>().is_err());
        assert!("".parse::<MealType>().is_err());
    }

    #[test]
    fn test_meal_type_for_hour() {
        assert_eq!(MealType::for_hour(4), MealType::Snack);
        assert_eq!(MealType::for_hour(5), MealType::Breakfast);
        assert_eq!(MealType::for_hour(10), MealType::Breakfast);
        assert_eq!(MealType::for_hour(11), MealType::Lunch);
        assert_eq!(MealType::for_hour(15), MealType::Lunch);
        assert_eq!(MealType::for_hour(16), MealType::Dinner);
        assert_eq!(MealType::for_hour(19), MealType::Dinner);
        assert_eq!(MealType::for_hour(20), MealType::Snack);
        assert_eq!(MealType::for_hour(23), MealType::Snack);
    }

    #[test]
    fn test_nutrition_rounded() {
        let n = NutritionData::new(57.6, 1.96, 12.04, 0.06, 0.649).rounded();
        assert!((n.calories - 58.0).abs() < f64::EPSILON);
        assert!((n.protein - 2.0).abs() < f64::EPSILON);
        assert!((n.carbs - 12.0).abs() < f64::EPSILON);
        assert!((n.fat - 0.1).abs() < f64::EPSILON);
        assert!((n.fiber - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nutrition_is_valid() {
        assert!(NutritionData::ZERO.is_valid());
        assert!(!NutritionData::new(-1.0, 0.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!NutritionData::new(f64::NAN, 0.0, 0.0, 0.0, 0.0).is_valid());
        assert!(NutritionData::new(MAX_NUTRIENT_VALUE, 0.0, 0.0, 0.0, 0.0).is_valid());
        assert!(!NutritionData::new(1e300, 0.0, 0.0, 0.0, 0.0).is_valid());
    }

    #[test]
    fn test_daily_goals_from_calorie_goal() {
        let goals = DailyGoals::from_calorie_goal(2000);
        // 2000 * 17.5% / 4 = 87.5g protein
        assert!((goals.protein_g - 87.5).abs() < 0.001);
        assert!((goals.fiber_g - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_profile_validate() {
        let mut p = NewProfile {
            name: "Meena".to_string(),
            height_cm: 160.0,
            weight_kg: 55.0,
            age: 30,
            gender: Gender::Female,
            activity_level: ActivityLevel::Moderate,
        };
        assert!(p.validate().is_ok());
        p.age = 0;
        assert!(p.validate().is_err());
        p.age = 30;
        p.weight_kg = 0.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_update_profile_apply_to() {
        let current = NewProfile {
            name: "Arun".to_string(),
            height_cm: 172.0,
            weight_kg: 70.0,
            age: 28,
            gender: Gender::Male,
            activity_level: ActivityLevel::Light,
        };
        let update = UpdateProfile {
            weight_kg: Some(68.0),
            activity_level: Some(ActivityLevel::Active),
            ..UpdateProfile::default()
        };
        let merged = update.apply_to(current);
        assert_eq!(merged.name, "Arun");
        assert!((merged.weight_kg - 68.0).abs() < f64::EPSILON);
        assert!((merged.height_cm - 172.0).abs() < f64::EPSILON);
        assert_eq!(merged.activity_level, ActivityLevel::Active);
    }

    #[test]
    fn test_validate_log_entry() {
        let mut entry = NewFoodLogEntry {
            food_name: "Idli".to_string(),
            quantity: 2.0,
            unit: "piece".to_string(),
            nutrition: NutritionData::new(58.0, 2.0, 12.0, 0.1, 0.6),
            meal_type: MealType::Breakfast,
            notes: None,
            source: EntrySource::Catalog,
            logged_at: NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        };
        assert!(validate_log_entry(&entry).is_ok());

        entry.quantity = 0.0;
        assert!(validate_log_entry(&entry).is_err());

        entry.quantity = 1.0;
        entry.food_name = "   ".to_string();
        assert!(validate_log_entry(&entry).is_err());
    }

    #[test]
    fn test_log_entry_serializes_flat_nutrition() {
        let entry = FoodLogEntry {
            id: 1,
            uuid: "u".to_string(),
            food_name: "Dosa".to_string(),
            quantity: 1.0,
            unit: "piece".to_string(),
            nutrition: NutritionData::new(84.0, 2.0, 14.0, 2.0, 0.6),
            meal_type: MealType::Breakfast,
            notes: None,
            source: EntrySource::Catalog,
            logged_at: NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["calories"], 84.0);
        assert_eq!(json["meal_type"], "breakfast");
        assert_eq!(json["source"], "catalog");
        assert!(json.get("notes").is_none());
    }
}
