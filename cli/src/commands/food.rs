use std::path::Path;

use anyhow::{Context, Result};
use std::process;

use thali_core::models::{
    EstimateSource, NewCustomFood, NutritionData, parse_amount_or_zero, parse_positive,
};
use thali_core::service::ThaliService;

use super::helpers::{format_quantity, json_error, no_neg_zero, print_food_table};
use super::log::print_estimate_notes;

pub(crate) fn cmd_food_list(svc: &ThaliService, category: Option<&str>, json: bool) -> Result<()> {
    let foods = svc.list_foods(category)?;

    if foods.is_empty() {
        if json {
            println!("[]");
        } else if let Some(category) = category {
            eprintln!("No foods in category '{category}'. Try `thali food categories`");
        } else {
            eprintln!("No foods found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        print_food_table(&foods);
        if foods.iter().any(|f| f.is_custom) {
            println!("  * custom food");
        }
    }
    Ok(())
}

pub(crate) fn cmd_food_search(svc: &ThaliService, query: &str, json: bool) -> Result<()> {
    let foods = svc.search_foods(query)?;

    if foods.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No results found for '{query}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        print_food_table(&foods);
    }
    Ok(())
}

pub(crate) fn cmd_food_categories(svc: &ThaliService, json: bool) -> Result<()> {
    let categories = svc.food_categories()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else {
        for c in &categories {
            println!("{c}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_food_estimate(
    svc: &ThaliService,
    food: &str,
    quantity: &str,
    unit: &str,
    json: bool,
) -> Result<()> {
    let quantity = parse_positive("quantity", quantity)?;
    let estimate = svc.estimate_nutrition(food, quantity, unit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    let n = &estimate.nutrition;
    let source = match &estimate.source {
        EstimateSource::Catalog { category, custom: true } => format!("custom food, {category}"),
        EstimateSource::Catalog { category, .. } => format!("catalog, {category}"),
        EstimateSource::Heuristic { category } => format!("estimate, {category}"),
    };
    println!(
        "{}, {} {} ({source})",
        estimate.food_name,
        format_quantity(estimate.quantity),
        estimate.unit
    );
    println!(
        "  {:.0} kcal | P:{:.1}g C:{:.1}g F:{:.1}g Fib:{:.1}g",
        no_neg_zero(n.calories),
        no_neg_zero(n.protein),
        no_neg_zero(n.carbs),
        no_neg_zero(n.fat),
        no_neg_zero(n.fiber)
    );
    print_estimate_notes(&estimate);
    Ok(())
}

pub(crate) struct CustomFoodArgs {
    pub name: String,
    pub calories: String,
    pub protein: Option<String>,
    pub carbs: Option<String>,
    pub fat: Option<String>,
    pub fiber: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

pub(crate) fn cmd_food_add(svc: &ThaliService, args: CustomFoodArgs, json: bool) -> Result<()> {
    let per_100g = NutritionData::new(
        parse_positive("calories", &args.calories)?,
        parse_amount_or_zero("protein", args.protein.as_deref())?,
        parse_amount_or_zero("carbs", args.carbs.as_deref())?,
        parse_amount_or_zero("fat", args.fat.as_deref())?,
        parse_amount_or_zero("fiber", args.fiber.as_deref())?,
    );
    let food = svc.add_custom_food(&NewCustomFood {
        name: args.name,
        category: args.category,
        per_100g,
        description: args.description,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        let name = &food.name;
        let category = &food.category;
        println!("Added food: {name} ({category})");
    }
    Ok(())
}

pub(crate) fn cmd_food_import(svc: &ThaliService, path: &Path, dry_run: bool, json: bool) -> Result<()> {
    let csv_data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let summary = svc.import_custom_foods_csv(&csv_data, dry_run)?;

    if summary.rows_parsed == 0 {
        if json {
            println!("{}", json_error("No rows found in CSV file"));
        } else {
            eprintln!("No rows found in CSV file.");
        }
        return Ok(());
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "dry_run": dry_run,
                "rows_parsed": summary.rows_parsed,
                "foods_created": summary.foods_created,
                "foods_skipped": summary.foods_skipped,
            })
        );
    } else if dry_run {
        println!("Dry run, no changes made.\n");
        println!("  Rows parsed:     {}", summary.rows_parsed);
        println!("  Foods to create: {}", summary.foods_created);
        println!("  Already known:   {}", summary.foods_skipped);
    } else {
        println!("Import complete.\n");
        println!("  Rows parsed:   {}", summary.rows_parsed);
        println!("  Foods created: {}", summary.foods_created);
        println!("  Already known: {}", summary.foods_skipped);
    }
    Ok(())
}

pub(crate) fn cmd_suggest(svc: &ThaliService, query: &str, json: bool) -> Result<()> {
    let names = svc.suggest_food_names(query);
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }
    if names.is_empty() {
        eprintln!("No suggestions for '{query}'");
        process::exit(2);
    }
    for name in &names {
        println!("{name}");
    }
    Ok(())
}
