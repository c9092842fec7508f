use anyhow::Result;
use chrono::{Duration, Local};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use thali_core::models::{DailySummary, GoalProgress};
use thali_core::service::ThaliService;

use super::helpers::{format_entry, no_neg_zero, parse_date};

pub(crate) fn cmd_summary(svc: &ThaliService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let summary = svc.daily_summary(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== {date} ===\n");

    if summary.entry_count == 0 {
        println!("  No entries logged.\n");
    }

    for meal in summary.meals.iter().filter(|m| !m.entries.is_empty()) {
        let label = meal.meal_type.as_str().to_uppercase();
        let sub_cal = no_neg_zero(meal.subtotal.calories);
        println!("  {label} ({sub_cal:.0} kcal)");
        for e in &meal.entries {
            println!("    {}", format_entry(e));
        }
        println!();
    }

    print_totals(&summary);
    if let Some(progress) = &summary.progress {
        print_progress(progress);
    }
    Ok(())
}

fn print_totals(summary: &DailySummary) {
    let t = &summary.totals;
    let cal = no_neg_zero(t.calories);
    let p = no_neg_zero(t.protein);
    let c = no_neg_zero(t.carbs);
    let f = no_neg_zero(t.fat);
    let fib = no_neg_zero(t.fiber);
    println!("  TOTAL: {cal:.0} kcal | P:{p:.1}g C:{c:.1}g F:{f:.1}g Fib:{fib:.1}g");
}

fn print_progress(progress: &GoalProgress) {
    let g = &progress.goals;
    let goal = g.calories;
    let pct = progress.calorie_progress * 100.0;
    let remaining = progress.calories_remaining;
    println!("  GOAL: {goal} kcal ({pct:.0}%)");
    if remaining >= 0.0 {
        println!("  REMAINING: {remaining:.0} kcal");
    } else {
        let over = -remaining;
        println!("  OVER BY: {over:.0} kcal");
    }
    let protein_pct = progress.protein_progress * 100.0;
    let fiber_pct = progress.fiber_progress * 100.0;
    println!(
        "  Protein {protein_pct:.0}% of {:.0}g | Fiber {fiber_pct:.0}% of {:.0}g",
        g.protein_g, g.fiber_g
    );
}

/// Seven days from `start`; defaults to the week ending today.
pub(crate) fn cmd_week(svc: &ThaliService, start: Option<String>, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct DayRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Entries")]
        entries: usize,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "Fiber")]
        fiber: String,
    }

    let start = match start {
        Some(s) => parse_date(Some(s))?,
        None => Local::now().date_naive() - Duration::days(6),
    };
    let week = svc.weekly_summary(start)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&week)?);
        return Ok(());
    }

    let rows: Vec<DayRow> = week
        .days
        .iter()
        .map(|d| {
            let t = &d.totals;
            DayRow {
                date: d.date.format("%a %Y-%m-%d").to_string(),
                entries: d.entry_count,
                calories: format!("{:.0}", no_neg_zero(t.calories)),
                protein: format!("{:.1}g", no_neg_zero(t.protein)),
                carbs: format!("{:.1}g", no_neg_zero(t.carbs)),
                fat: format!("{:.1}g", no_neg_zero(t.fat)),
                fiber: format!("{:.1}g", no_neg_zero(t.fiber)),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let (from, to) = (week.start, week.end);
    let logged = week.logged_days;
    let avg = week.average_daily_calories;
    println!("\n  {from} to {to}: {logged}/7 days logged, average {avg:.0} kcal/day");
    if let Some(met) = week.days_goal_met {
        println!("  Calorie goal met on {met} of 7 days");
    }
    Ok(())
}

pub(crate) fn cmd_streak(svc: &ThaliService, json: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let streak = svc.logging_streak(today)?;

    if json {
        println!("{}", serde_json::json!({ "streak_days": streak, "as_of": today }));
        return Ok(());
    }

    match streak {
        0 => println!("No current logging streak. Log a meal to start one!"),
        1 => println!("1 day logging streak"),
        n => println!("{n} day logging streak"),
    }
    Ok(())
}
