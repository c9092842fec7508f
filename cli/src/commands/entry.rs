use anyhow::{Result, bail};

use thali_core::models::{NutritionData, UpdateFoodLogEntry, parse_amount_or_zero, parse_positive};
use thali_core::service::ThaliService;

use super::helpers::{exit_not_found, format_entry, parse_date, parse_meal};

pub(crate) struct EditArgs {
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub meal: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub clear_notes: bool,
    pub calories: Option<String>,
    pub protein: Option<String>,
    pub carbs: Option<String>,
    pub fat: Option<String>,
    pub fiber: Option<String>,
}

pub(crate) fn cmd_edit(svc: &ThaliService, entry_id: i64, args: EditArgs, json: bool) -> Result<()> {
    let Some(current) = svc.get_entry(entry_id)? else {
        exit_not_found(&format!("Entry {entry_id} not found"), json);
    };

    let macros_given = args.protein.is_some()
        || args.carbs.is_some()
        || args.fat.is_some()
        || args.fiber.is_some();
    let nutrition = match args.calories.as_deref() {
        Some(cal) => {
            let amount = |field: &'static str, raw: Option<&str>, current: f64| {
                raw.map_or(Ok(current), |s| parse_amount_or_zero(field, Some(s)))
            };
            let n = &current.nutrition;
            Some(NutritionData::new(
                parse_positive("calories", cal)?,
                amount("protein", args.protein.as_deref(), n.protein)?,
                amount("carbs", args.carbs.as_deref(), n.carbs)?,
                amount("fat", args.fat.as_deref(), n.fat)?,
                amount("fiber", args.fiber.as_deref(), n.fiber)?,
            ))
        }
        None if macros_given => bail!("--calories is required when overriding nutrition"),
        None => None,
    };

    let notes = if args.clear_notes {
        Some(None)
    } else {
        args.notes.map(Some)
    };

    // A new date keeps the entry's time of day.
    let logged_at = match args.date {
        Some(d) => Some(parse_date(Some(d))?.and_time(current.logged_at.time())),
        None => None,
    };

    let update = UpdateFoodLogEntry {
        quantity: args
            .quantity
            .as_deref()
            .map(|s| parse_positive("quantity", s))
            .transpose()?,
        unit: args.unit,
        meal_type: parse_meal(args.meal.as_deref())?,
        logged_at,
        notes,
        nutrition,
    };

    if update.is_empty() {
        bail!(
            "Nothing to update. Provide at least one of --quantity, --unit, --meal, --date, --notes or --calories"
        );
    }

    let entry = svc.update_entry(entry_id, &update)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let meal = entry.meal_type;
        let date = entry.date();
        println!("Updated ({meal}, {date}):");
        println!("  {}", format_entry(&entry));
    }
    Ok(())
}

pub(crate) fn cmd_delete(svc: &ThaliService, entry_id: i64, json: bool) -> Result<()> {
    if !svc.delete_entry(entry_id)? {
        exit_not_found(&format!("Entry {entry_id} not found"), json);
    }
    if json {
        println!("{}", serde_json::json!({ "deleted": entry_id }));
    } else {
        println!("Deleted entry {entry_id}");
    }
    Ok(())
}
