//! Nutrition engine: energy requirements, portion estimation and aggregation.
//!
//! BMR follows Mifflin-St Jeor (1990). Portion estimation scales per-100g
//! reference values by a unit factor. Aggregation accumulates in fixed-point
//! thousandths so that totals do not depend on the order of the entries.

use chrono::{Duration, NaiveDate};
use tracing::warn;

use crate::models::{
    ActivityLevel, DailyGoals, DailySummary, EstimateSource, FoodCatalogItem, FoodLogEntry,
    Gender, GoalProgress, MealBreakdown, MealType, NutritionData, NutritionEstimate,
    WeeklySummary,
};

/// Multiplier used when an activity label is not recognised.
pub const DEFAULT_ACTIVITY_MULTIPLIER: f64 = 1.375;

/// A day "meets" its goal when calories land within this fraction of it.
pub const GOAL_TOLERANCE: f64 = 0.10;

// --- Energy requirements ---

/// Basal metabolic rate in kcal/day.
///
/// Male: `10w + 6.25h - 5a + 5`. Female and any other gender: `... - 161`.
#[must_use]
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female | Gender::Other => base - 161.0,
    }
}

#[must_use]
pub fn calculate_daily_calorie_goal(bmr: f64, activity_level: ActivityLevel) -> i64 {
    goal_with_multiplier(bmr, activity_level.multiplier())
}

/// Same as [`calculate_daily_calorie_goal`] for a free-text activity label.
#[must_use]
pub fn calculate_daily_calorie_goal_for_label(bmr: f64, activity_label: &str) -> i64 {
    goal_with_multiplier(bmr, activity_multiplier(activity_label))
}

#[must_use]
pub fn activity_multiplier(activity_label: &str) -> f64 {
    ActivityLevel::from_label(activity_label).map_or_else(
        || {
            warn!(label = activity_label, "unknown activity level, using default multiplier");
            DEFAULT_ACTIVITY_MULTIPLIER
        },
        ActivityLevel::multiplier,
    )
}

#[allow(clippy::cast_possible_truncation)]
fn goal_with_multiplier(bmr: f64, multiplier: f64) -> i64 {
    (bmr * multiplier).round() as i64
}

// --- Portions ---

/// Multiplier applied to per-100g values for a quantity and unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portion {
    pub multiplier: f64,
    /// The unit was not recognised and a 1x factor was used.
    pub assumed: bool,
}

/// Factor for a single unit of `unit`, relative to 100 g.
#[must_use]
pub fn unit_factor(unit: &str) -> Portion {
    let unit = unit.trim().to_lowercase();
    let known = |factor| Portion {
        multiplier: factor,
        assumed: false,
    };
    match unit.as_str() {
        "piece" | "pieces" | "pc" | "pcs" => known(0.5),
        "cup" | "cups" => known(1.5),
        "bowl" | "bowls" => known(2.0),
        "g" | "gram" | "grams" => known(0.01),
        other => match grams_prefix(other) {
            Some(grams) => known(grams / 100.0),
            None => Portion {
                multiplier: 1.0,
                assumed: true,
            },
        },
    }
}

/// Parses `"50g"` / `"250 g"` / `"100grams"` into the gram amount.
fn grams_prefix(unit: &str) -> Option<f64> {
    let number = unit
        .strip_suffix("grams")
        .or_else(|| unit.strip_suffix("gram"))
        .or_else(|| unit.strip_suffix('g'))?
        .trim();
    let grams: f64 = number.parse().ok()?;
    (grams.is_finite() && grams > 0.0).then_some(grams)
}

#[must_use]
pub fn portion_multiplier(quantity: f64, unit: &str) -> Portion {
    let factor = unit_factor(unit);
    Portion {
        multiplier: quantity * factor.multiplier,
        assumed: factor.assumed,
    }
}

// --- Estimation ---

/// Scale a catalog item's per-100g values to the given quantity.
#[must_use]
pub fn estimate_nutrition_for_quantity(
    item: &FoodCatalogItem,
    quantity: f64,
    unit: &str,
) -> NutritionEstimate {
    let portion = portion_multiplier(quantity, unit);
    if portion.assumed {
        warn!(food = %item.name, unit, "unrecognised unit, assuming a 100g portion per unit");
    }
    NutritionEstimate {
        food_name: item.name.clone(),
        quantity,
        unit: unit.to_string(),
        nutrition: item.per_100g().scaled(portion.multiplier).rounded(),
        source: EstimateSource::Catalog {
            category: item.category.clone(),
            custom: item.is_custom,
        },
        assumed_portion: portion.assumed,
    }
}

/// Keyword groups checked in order; the first group with a hit wins.
const HEURISTICS: &[(&[&str], &str, [f64; 5])] = &[
    (&["rice"], "rice", [130.0, 2.7, 28.0, 0.3, 0.4]),
    (&["chicken"], "chicken", [165.0, 31.0, 0.0, 3.6, 0.0]),
    (&["fish"], "fish", [206.0, 22.0, 0.0, 12.0, 0.0]),
    (&["egg"], "egg", [155.0, 13.0, 1.1, 11.0, 0.0]),
    (&["dal", "lentil"], "dal", [116.0, 9.0, 20.0, 0.4, 8.0]),
    (&["vegetable", "curry"], "vegetable", [80.0, 3.0, 15.0, 2.0, 4.0]),
    (&["bread", "roti"], "bread", [265.0, 9.0, 49.0, 4.0, 3.0]),
    (&["milk"], "milk", [42.0, 3.4, 5.0, 1.0, 0.0]),
    (&["fruit", "apple", "banana"], "fruit", [52.0, 0.3, 14.0, 0.2, 2.4]),
];

const GENERIC_ESTIMATE: [f64; 5] = [100.0, 5.0, 15.0, 3.0, 2.0];

fn heuristic_base(name: &str) -> (&'static str, NutritionData) {
    let lower = name.to_lowercase();
    let (category, v) = HEURISTICS
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(("generic", GENERIC_ESTIMATE), |(_, category, values)| {
            (*category, *values)
        });
    (category, NutritionData::new(v[0], v[1], v[2], v[3], v[4]))
}

/// Best-effort guess for a food that is not in the catalog.
///
/// The result is always labelled [`EstimateSource::Heuristic`].
#[must_use]
pub fn estimate_nutrition_for_unknown_food(
    name: &str,
    quantity: f64,
    unit: &str,
) -> NutritionEstimate {
    let (category, base) = heuristic_base(name);
    let portion = portion_multiplier(quantity, unit);
    warn!(food = name, category, "no catalog match, using heuristic estimate");
    if portion.assumed {
        warn!(food = name, unit, "unrecognised unit, assuming a 100g portion per unit");
    }
    NutritionEstimate {
        food_name: name.to_string(),
        quantity,
        unit: unit.to_string(),
        nutrition: base.scaled(portion.multiplier).rounded(),
        source: EstimateSource::Heuristic {
            category: category.to_string(),
        },
        assumed_portion: portion.assumed,
    }
}

// --- Aggregation ---

const FIXED_SCALE: f64 = 1000.0;

/// Sum of nutrients in thousandths. Integer addition keeps the total
/// independent of the order in which entries are added; it saturates
/// instead of overflowing.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    calories: i128,
    protein: i128,
    carbs: i128,
    fat: i128,
    fiber: i128,
}

impl Accumulator {
    #[allow(clippy::cast_possible_truncation)]
    fn add(&mut self, n: &NutritionData) {
        let fixed = |v: f64| (v * FIXED_SCALE).round() as i128;
        self.calories = self.calories.saturating_add(fixed(n.calories));
        self.protein = self.protein.saturating_add(fixed(n.protein));
        self.carbs = self.carbs.saturating_add(fixed(n.carbs));
        self.fat = self.fat.saturating_add(fixed(n.fat));
        self.fiber = self.fiber.saturating_add(fixed(n.fiber));
    }

    #[allow(clippy::cast_precision_loss)]
    fn total(&self) -> NutritionData {
        let float = |v: i128| v as f64 / FIXED_SCALE;
        NutritionData::new(
            float(self.calories),
            float(self.protein),
            float(self.carbs),
            float(self.fat),
            float(self.fiber),
        )
    }
}

#[must_use]
pub fn sum_nutrition<'a>(items: impl IntoIterator<Item = &'a NutritionData>) -> NutritionData {
    let mut acc = Accumulator::default();
    for n in items {
        acc.add(n);
    }
    acc.total()
}

/// Totals and per-meal breakdown for the entries logged on `date`.
///
/// Entries from other days are ignored. Every meal type is present in the
/// breakdown, in breakfast/lunch/dinner/snack order.
#[must_use]
pub fn aggregate_daily(entries: &[FoodLogEntry], date: NaiveDate) -> DailySummary {
    let mut day: Vec<&FoodLogEntry> = entries.iter().filter(|e| e.date() == date).collect();
    day.sort_by(|a, b| a.logged_at.cmp(&b.logged_at).then(a.id.cmp(&b.id)));

    let meals = MealType::ALL
        .into_iter()
        .map(|meal_type| {
            let meal_entries: Vec<FoodLogEntry> = day
                .iter()
                .filter(|e| e.meal_type == meal_type)
                .map(|e| (*e).clone())
                .collect();
            let subtotal = sum_nutrition(meal_entries.iter().map(|e| &e.nutrition));
            MealBreakdown {
                meal_type,
                entries: meal_entries,
                subtotal,
            }
        })
        .collect();

    DailySummary {
        date,
        totals: sum_nutrition(day.iter().map(|e| &e.nutrition)),
        meals,
        entry_count: day.len(),
        progress: None,
    }
}

#[must_use]
pub fn goal_progress(totals: &NutritionData, calorie_goal: i64) -> GoalProgress {
    let goals = DailyGoals::from_calorie_goal(calorie_goal);
    let ratio = |value: f64, goal: f64| if goal > 0.0 { value / goal } else { 0.0 };
    #[allow(clippy::cast_precision_loss)]
    let calorie_goal = calorie_goal as f64;
    GoalProgress {
        goals,
        calorie_progress: ratio(totals.calories, calorie_goal),
        protein_progress: ratio(totals.protein, goals.protein_g),
        fiber_progress: ratio(totals.fiber, goals.fiber_g),
        calories_remaining: calorie_goal - totals.calories,
    }
}

/// [`aggregate_daily`] plus goal progress when a calorie goal is known.
#[must_use]
pub fn daily_summary_with_goal(
    entries: &[FoodLogEntry],
    date: NaiveDate,
    calorie_goal: Option<i64>,
) -> DailySummary {
    let mut summary = aggregate_daily(entries, date);
    summary.progress = calorie_goal.map(|goal| goal_progress(&summary.totals, goal));
    summary
}

#[must_use]
pub fn meets_goal(summary: &DailySummary, calorie_goal: i64) -> bool {
    if summary.entry_count == 0 || calorie_goal <= 0 {
        return false;
    }
    #[allow(clippy::cast_precision_loss)]
    let goal = calorie_goal as f64;
    (summary.totals.calories - goal).abs() <= goal * GOAL_TOLERANCE
}

/// Seven consecutive days starting at `start`.
#[must_use]
pub fn aggregate_weekly(
    entries: &[FoodLogEntry],
    start: NaiveDate,
    calorie_goal: Option<i64>,
) -> WeeklySummary {
    let days: Vec<DailySummary> = (0..7)
        .map(|offset| daily_summary_with_goal(entries, start + Duration::days(offset), calorie_goal))
        .collect();

    let totals = sum_nutrition(days.iter().map(|d| &d.totals));
    let logged: Vec<&DailySummary> = days.iter().filter(|d| d.entry_count > 0).collect();
    #[allow(clippy::cast_precision_loss)]
    let average_daily_calories = if logged.is_empty() {
        0.0
    } else {
        sum_nutrition(logged.iter().map(|d| &d.totals)).calories / logged.len() as f64
    };
    let days_goal_met =
        calorie_goal.map(|goal| days.iter().filter(|d| meets_goal(d, goal)).count());

    WeeklySummary {
        start,
        end: start + Duration::days(6),
        logged_days: logged.len(),
        days,
        totals,
        average_daily_calories,
        days_goal_met,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntrySource;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: i64, day: NaiveDate, hour: u32, meal: MealType, n: NutritionData) -> FoodLogEntry {
        FoodLogEntry {
            id,
            uuid: format!("uuid-{id}"),
            food_name: format!("food {id}"),
            quantity: 1.0,
            unit: "piece".to_string(),
            nutrition: n,
            meal_type: meal,
            notes: None,
            source: EntrySource::Catalog,
            logged_at: day.and_hms_opt(hour, 0, 0).unwrap(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn idli() -> FoodCatalogItem {
        FoodCatalogItem {
            name: "Idli".to_string(),
            category: "Breakfast".to_string(),
            calories_per_100g: 58.0,
            protein_per_100g: 2.0,
            carbs_per_100g: 12.0,
            fat_per_100g: 0.1,
            fiber_per_100g: 0.6,
            description: "Steamed rice and lentil cakes".to_string(),
            is_custom: false,
        }
    }

    #[test]
    fn test_bmr_male() {
        let bmr = calculate_bmr(70.0, 175.0, 30, Gender::Male);
        // 700 + 1093.75 - 150 + 5
        assert!((bmr - 1648.75).abs() < 0.001);
    }

    #[test]
    fn test_bmr_female_and_other() {
        let female = calculate_bmr(60.0, 165.0, 25, Gender::Female);
        // 600 + 1031.25 - 125 - 161
        assert!((female - 1345.25).abs() < 0.001);
        let other = calculate_bmr(60.0, 165.0, 25, Gender::Other);
        assert!((other - female).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bmr_formula_over_range() {
        for w in [45.0, 62.5, 80.0, 120.0] {
            for h in [150.0, 168.0, 190.0] {
                for a in [18, 35, 70] {
                    let expected = 10.0 * w + 6.25 * h - 5.0 * f64::from(a);
                    assert!((calculate_bmr(w, h, a, Gender::Male) - (expected + 5.0)).abs() < 1e-9);
                    assert!(
                        (calculate_bmr(w, h, a, Gender::Female) - (expected - 161.0)).abs() < 1e-9
                    );
                }
            }
        }
    }

    #[test]
    fn test_calorie_goal_every_level() {
        let bmr: f64 = 1648.75;
        let expected = [
            (ActivityLevel::Sedentary, 1.2),
            (ActivityLevel::Light, 1.375),
            (ActivityLevel::Moderate, 1.55),
            (ActivityLevel::Active, 1.725),
            (ActivityLevel::VeryActive, 1.9),
        ];
        for (level, multiplier) in expected {
            #[allow(clippy::cast_possible_truncation)]
            let want = (bmr * multiplier).round() as i64;
            assert_eq!(calculate_daily_calorie_goal(bmr, level), want, "{level}");
            assert_eq!(calculate_daily_calorie_goal_for_label(bmr, level.as_str()), want);
        }
        assert_eq!(calculate_daily_calorie_goal(1648.75, ActivityLevel::Moderate), 2556);
    }

    #[test]
    fn test_calorie_goal_unknown_label_defaults() {
        let bmr = 1500.0;
        assert_eq!(calculate_daily_calorie_goal_for_label(bmr, "couch potato"), 2063);
        assert!((activity_multiplier("") - DEFAULT_ACTIVITY_MULTIPLIER).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unit_factors() {
        assert!((unit_factor("piece").multiplier - 0.5).abs() < f64::EPSILON);
        assert!((unit_factor("Pieces").multiplier - 0.5).abs() < f64::EPSILON);
        assert!((unit_factor("cup").multiplier - 1.5).abs() < f64::EPSILON);
        assert!((unit_factor("bowls").multiplier - 2.0).abs() < f64::EPSILON);
        assert!((unit_factor("100g").multiplier - 1.0).abs() < f64::EPSILON);
        assert!((unit_factor("50g").multiplier - 0.5).abs() < f64::EPSILON);
        assert!((unit_factor("250 g").multiplier - 2.5).abs() < f64::EPSILON);
        assert!((unit_factor("g").multiplier - 0.01).abs() < f64::EPSILON);
        assert!(!unit_factor("grams").assumed);
    }

    #[test]
    fn test_unknown_unit_is_flagged() {
        let p = unit_factor("handful");
        assert!(p.assumed);
        assert!((p.multiplier - 1.0).abs() < f64::EPSILON);
        assert!(unit_factor("0g").assumed);
        assert!(unit_factor("-5g").assumed);
    }

    #[test]
    fn test_estimate_idli_two_pieces() {
        let est = estimate_nutrition_for_quantity(&idli(), 2.0, "piece");
        assert!((est.nutrition.calories - 58.0).abs() < f64::EPSILON);
        assert!((est.nutrition.protein - 2.0).abs() < 0.001);
        assert!((est.nutrition.carbs - 12.0).abs() < 0.001);
        assert!((est.nutrition.fiber - 0.6).abs() < 0.001);
        assert!(!est.assumed_portion);
        assert_eq!(
            est.source,
            EstimateSource::Catalog {
                category: "Breakfast".to_string(),
                custom: false
            }
        );
    }

    #[test]
    fn test_estimate_rounds_calories_and_macros() {
        // 58 * 1.5 * 0.5 = 43.5 -> 44; protein 2 * 0.75 = 1.5
        let est = estimate_nutrition_for_quantity(&idli(), 1.5, "piece");
        assert!((est.nutrition.calories - 44.0).abs() < f64::EPSILON);
        assert!((est.nutrition.protein - 1.5).abs() < 0.001);
        // fat 0.1 * 0.75 = 0.075 -> 0.1
        assert!((est.nutrition.fat - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_estimate_unknown_food_chicken() {
        let est = estimate_nutrition_for_unknown_food("Chicken Biryani", 1.0, "100g");
        assert!((est.nutrition.calories - 165.0).abs() < f64::EPSILON);
        assert!((est.nutrition.protein - 31.0).abs() < 0.001);
        assert!((est.nutrition.carbs).abs() < 0.001);
        assert!((est.nutrition.fat - 3.6).abs() < 0.001);
        assert!((est.nutrition.fiber).abs() < 0.001);
        assert_eq!(
            est.source,
            EstimateSource::Heuristic {
                category: "chicken".to_string()
            }
        );
    }

    #[test]
    fn test_estimate_unknown_food_keyword_order() {
        // "rice" is checked before "chicken"
        let est = estimate_nutrition_for_unknown_food("Chicken Fried Rice", 1.0, "100g");
        assert!((est.nutrition.calories - 130.0).abs() < f64::EPSILON);
        let est = estimate_nutrition_for_unknown_food("Paneer Curry", 1.0, "100g");
        assert!((est.nutrition.calories - 80.0).abs() < f64::EPSILON);
        let est = estimate_nutrition_for_unknown_food("Masoor Lentil Soup", 1.0, "100g");
        assert!((est.nutrition.calories - 116.0).abs() < f64::EPSILON);
        let est = estimate_nutrition_for_unknown_food("Banana", 1.0, "100g");
        assert!((est.nutrition.calories - 52.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_estimate_unknown_food_generic() {
        let est = estimate_nutrition_for_unknown_food("Mystery Snack", 2.0, "bowl");
        // generic 100 kcal * 2 bowls * 2.0
        assert!((est.nutrition.calories - 400.0).abs() < f64::EPSILON);
        assert!((est.nutrition.protein - 20.0).abs() < 0.001);
        assert_eq!(
            est.source,
            EstimateSource::Heuristic {
                category: "generic".to_string()
            }
        );
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate_daily(&[], date(2024, 6, 15));
        assert_eq!(summary.totals, NutritionData::ZERO);
        assert_eq!(summary.entry_count, 0);
        assert_eq!(summary.meals.len(), 4);
        assert!(summary.meals.iter().all(|m| m.entries.is_empty()));
    }

    #[test]
    fn test_aggregate_filters_by_date() {
        let day = date(2024, 6, 15);
        let entries = vec![
            entry(1, day, 8, MealType::Breakfast, NutritionData::new(58.0, 2.0, 12.0, 0.1, 0.6)),
            entry(
                2,
                date(2024, 6, 14),
                23,
                MealType::Snack,
                NutritionData::new(500.0, 0.0, 0.0, 0.0, 0.0),
            ),
        ];
        let summary = aggregate_daily(&entries, day);
        assert_eq!(summary.entry_count, 1);
        assert!((summary.totals.calories - 58.0).abs() < f64::EPSILON);
        assert_eq!(summary.meal(MealType::Breakfast).unwrap().entries.len(), 1);
        assert!(summary.meal(MealType::Snack).unwrap().entries.is_empty());
    }

    #[test]
    fn test_aggregate_two_entries_any_order() {
        let day = date(2024, 6, 15);
        let a = entry(1, day, 8, MealType::Breakfast, NutritionData::new(58.0, 2.0, 12.0, 0.1, 0.6));
        let b = entry(2, day, 13, MealType::Lunch, NutritionData::new(130.0, 2.7, 28.0, 0.3, 0.4));

        for entries in [vec![a.clone(), b.clone()], vec![b, a]] {
            let t = aggregate_daily(&entries, day).totals;
            assert!((t.calories - 188.0).abs() < f64::EPSILON);
            assert!((t.protein - 4.7).abs() < f64::EPSILON);
            assert!((t.fiber - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_aggregate_huge_values_do_not_overflow() {
        let day = date(2024, 6, 15);
        let huge = NutritionData::new(1e300, 1e300, 0.0, 0.0, 0.0);
        let entries = vec![
            entry(1, day, 8, MealType::Breakfast, huge),
            entry(2, day, 9, MealType::Breakfast, huge),
        ];

        let t = aggregate_daily(&entries, day).totals;
        assert!(t.calories.is_finite());
        assert!(t.calories > 0.0);
        assert!(t.carbs.abs() < f64::EPSILON);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let day = date(2024, 6, 15);
        let values = [
            NutritionData::new(58.0, 2.0, 12.0, 0.1, 0.6),
            NutritionData::new(130.0, 2.7, 28.0, 0.3, 0.4),
            NutritionData::new(0.1, 0.2, 0.3, 0.7, 0.9),
            NutritionData::new(333.3, 11.1, 45.6, 9.9, 3.3),
            NutritionData::new(12.345, 0.05, 1.15, 2.25, 0.35),
        ];
        let entries: Vec<FoodLogEntry> = values
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let id = i64::try_from(i).unwrap();
                entry(id, day, 8 + u32::try_from(i).unwrap(), MealType::ALL[i % 4], *n)
            })
            .collect();

        let baseline = aggregate_daily(&entries, day).totals;

        // every permutation of five entries
        let mut order: Vec<usize> = (0..entries.len()).collect();
        let mut seen = 0;
        permute(&mut order, 0, &mut |perm| {
            let shuffled: Vec<FoodLogEntry> = perm.iter().map(|&i| entries[i].clone()).collect();
            let totals = aggregate_daily(&shuffled, day).totals;
            assert_eq!(totals.calories.to_bits(), baseline.calories.to_bits());
            assert_eq!(totals.protein.to_bits(), baseline.protein.to_bits());
            assert_eq!(totals.carbs.to_bits(), baseline.carbs.to_bits());
            assert_eq!(totals.fat.to_bits(), baseline.fat.to_bits());
            assert_eq!(totals.fiber.to_bits(), baseline.fiber.to_bits());
            seen += 1;
        });
        assert_eq!(seen, 120);
    }

    fn permute(items: &mut [usize], k: usize, visit: &mut impl FnMut(&[usize])) {
        if k == items.len() {
            visit(items);
            return;
        }
        for i in k..items.len() {
            items.swap(k, i);
            permute(items, k + 1, visit);
            items.swap(k, i);
        }
    }

    #[test]
    fn test_aggregate_meal_subtotals() {
        let day = date(2024, 6, 15);
        let entries = vec![
            entry(1, day, 8, MealType::Breakfast, NutritionData::new(58.0, 2.0, 12.0, 0.1, 0.6)),
            entry(2, day, 9, MealType::Breakfast, NutritionData::new(84.0, 2.0, 14.0, 2.0, 0.6)),
            entry(3, day, 13, MealType::Lunch, NutritionData::new(130.0, 2.7, 28.0, 0.3, 0.4)),
        ];
        let summary = aggregate_daily(&entries, day);
        let breakfast = summary.meal(MealType::Breakfast).unwrap();
        assert_eq!(breakfast.entries.len(), 2);
        assert!((breakfast.subtotal.calories - 142.0).abs() < f64::EPSILON);
        let order: Vec<MealType> = summary.meals.iter().map(|m| m.meal_type).collect();
        assert_eq!(order, MealType::ALL.to_vec());
    }

    #[test]
    fn test_goal_progress() {
        let totals = NutritionData::new(1500.0, 43.75, 200.0, 50.0, 15.0);
        let p = goal_progress(&totals, 2000);
        assert!((p.calorie_progress - 0.75).abs() < 0.0001);
        assert!((p.protein_progress - 0.5).abs() < 0.0001);
        assert!((p.fiber_progress - 0.5).abs() < 0.0001);
        assert!((p.calories_remaining - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weekly_summary() {
        let start = date(2024, 6, 10);
        let entries = vec![
            entry(1, start, 8, MealType::Breakfast, NutritionData::new(1950.0, 0.0, 0.0, 0.0, 0.0)),
            entry(
                2,
                start + Duration::days(2),
                13,
                MealType::Lunch,
                NutritionData::new(1000.0, 0.0, 0.0, 0.0, 0.0),
            ),
            // outside the week
            entry(
                3,
                start + Duration::days(7),
                13,
                MealType::Lunch,
                NutritionData::new(9999.0, 0.0, 0.0, 0.0, 0.0),
            ),
        ];
        let week = aggregate_weekly(&entries, start, Some(2000));
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.end, date(2024, 6, 16));
        assert_eq!(week.logged_days, 2);
        assert!((week.totals.calories - 2950.0).abs() < f64::EPSILON);
        assert!((week.average_daily_calories - 1475.0).abs() < f64::EPSILON);
        // 1950 is within 10% of 2000, 1000 is not, empty days never count
        assert_eq!(week.days_goal_met, Some(1));
        assert!(week.days[0].progress.is_some());
    }

    #[test]
    fn test_weekly_summary_without_goal() {
        let week = aggregate_weekly(&[], date(2024, 6, 10), None);
        assert_eq!(week.logged_days, 0);
        assert!(week.average_daily_calories.abs() < f64::EPSILON);
        assert_eq!(week.days_goal_met, None);
    }
}
