use anyhow::Result;
use serde::Serialize;

use thali_core::models::{
    EstimateSource, FoodLogEntry, NutritionData, NutritionEstimate, ScanResult,
    parse_amount_or_zero, parse_positive,
};
use thali_core::recognition::SimulatedRecognizer;
use thali_core::service::{LogFoodRequest, ManualEntryRequest, ThaliService};

use super::helpers::{format_entry, parse_meal, prompt_line, prompt_until, resolve_logged_at};

pub(crate) struct LogArgs {
    pub meal: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
}

pub(crate) fn cmd_log(
    svc: &ThaliService,
    food: &str,
    quantity: &str,
    unit: &str,
    args: LogArgs,
    json: bool,
) -> Result<()> {
    let quantity = parse_positive("quantity", quantity)?;
    let request = LogFoodRequest {
        food_name: food.to_string(),
        quantity,
        unit: unit.to_string(),
        meal_type: parse_meal(args.meal.as_deref())?,
        logged_at: resolve_logged_at(args.date)?,
        notes: args.notes,
    };

    let (entry, estimate) = svc.log_food_with_estimate(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    print_logged(&entry);
    print_estimate_notes(&estimate);
    Ok(())
}

pub(crate) fn print_estimate_notes(estimate: &NutritionEstimate) {
    if let EstimateSource::Heuristic { category } = &estimate.source {
        eprintln!(
            "Note: '{}' is not in the catalog; values are a rough {category} estimate",
            estimate.food_name
        );
    }
    if estimate.assumed_portion {
        eprintln!(
            "Note: unit '{}' not recognised; assumed one standard portion per unit",
            estimate.unit
        );
    }
}

fn print_logged(entry: &FoodLogEntry) {
    let meal = entry.meal_type;
    let date = entry.date();
    println!("Logged to {meal} on {date}:");
    println!("  {}", format_entry(entry));
}

/// Fields for a manual entry; missing ones are prompted for.
pub(crate) struct ManualArgs {
    pub name: Option<String>,
    pub portion: Option<String>,
    pub calories: Option<String>,
    pub protein: Option<String>,
    pub carbs: Option<String>,
    pub fat: Option<String>,
    pub fiber: Option<String>,
    pub save: bool,
}

fn optional_amount(label: &str, field: &'static str, preset: Option<String>) -> Result<f64> {
    prompt_until(label, preset, |s| parse_amount_or_zero(field, Some(s)))
}

pub(crate) fn cmd_add(svc: &ThaliService, manual: ManualArgs, args: LogArgs, json: bool) -> Result<()> {
    let food_name = match manual.name {
        Some(name) => name,
        None => loop {
            let name = prompt_line("Food name")?;
            if !name.is_empty() {
                break name;
            }
            eprintln!("  name must not be empty");
        },
    };
    let portion_g = prompt_until("Portion (g)", manual.portion, |s| {
        parse_positive("portion", s)
    })?;
    let calories = prompt_until("Calories (kcal)", manual.calories, |s| {
        parse_positive("calories", s)
    })?;
    let nutrition = NutritionData::new(
        calories,
        optional_amount("Protein (g, blank for 0)", "protein", manual.protein)?,
        optional_amount("Carbs (g, blank for 0)", "carbs", manual.carbs)?,
        optional_amount("Fat (g, blank for 0)", "fat", manual.fat)?,
        optional_amount("Fiber (g, blank for 0)", "fiber", manual.fiber)?,
    );

    let request = ManualEntryRequest {
        food_name,
        portion_g,
        nutrition,
        meal_type: parse_meal(args.meal.as_deref())?,
        logged_at: resolve_logged_at(args.date)?,
        notes: args.notes,
        save_as_custom_food: manual.save,
    };
    let entry = svc.log_manual(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }
    print_logged(&entry);
    if manual.save {
        println!("Saved '{}' as a custom food", entry.food_name);
    }
    Ok(())
}

pub(crate) struct ScanArgs {
    pub seed: Option<u64>,
    pub log: bool,
    pub quantity: String,
    pub unit: String,
}

pub(crate) fn cmd_scan(svc: &ThaliService, scan_args: ScanArgs, args: LogArgs, json: bool) -> Result<()> {
    #[derive(Serialize)]
    struct ScanOutput<'a> {
        scan: &'a ScanResult,
        #[serde(skip_serializing_if = "Option::is_none")]
        entry: Option<&'a FoodLogEntry>,
    }

    let mut recognizer = SimulatedRecognizer::new(scan_args.seed);
    let scan = svc.scan(&mut recognizer)?;

    let entry = if scan_args.log {
        let quantity = parse_positive("quantity", &scan_args.quantity)?;
        Some(svc.log_scan(
            &scan,
            quantity,
            &scan_args.unit,
            parse_meal(args.meal.as_deref())?,
            resolve_logged_at(args.date)?,
        )?)
    } else {
        None
    };

    if json {
        let out = ScanOutput {
            scan: &scan,
            entry: entry.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let item = &scan.item;
    let confidence = scan.confidence * 100.0;
    println!("Best guess: {} ({}, {confidence:.0}% confidence)", item.name, item.category);
    if scan.is_guess {
        println!("  (simulated result, no image analysis was performed)");
    }
    println!(
        "  Per 100g: {:.0} kcal | P:{:.1}g C:{:.1}g F:{:.1}g Fib:{:.1}g",
        item.calories_per_100g,
        item.protein_per_100g,
        item.carbs_per_100g,
        item.fat_per_100g,
        item.fiber_per_100g
    );
    if !scan.suggestions.is_empty() {
        println!("\nTips:");
        for tip in &scan.suggestions {
            println!("  - {tip}");
        }
    }
    if let Some(entry) = &entry {
        println!();
        print_logged(entry);
    }
    Ok(())
}
