use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use thali_core::models::{FoodCatalogItem, FoodLogEntry, InputError, MealType};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Timestamp for a new entry: the chosen date at the current clock time.
pub(crate) fn resolve_logged_at(date_str: Option<String>) -> Result<NaiveDateTime> {
    let now = Local::now().naive_local();
    let date = parse_date(date_str)?;
    Ok(date.and_time(now.time()))
}

pub(crate) fn parse_meal(meal: Option<&str>) -> Result<Option<MealType>> {
    Ok(meal.map(str::parse::<MealType>).transpose()?)
}

pub(crate) fn prompt_line(label: &str) -> Result<String> {
    eprint!("{label}: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(line.trim().to_string())
}

/// Use `preset` when given, otherwise ask until `parse` accepts the answer.
/// A bad preset is an error; a bad answer is reported and asked again.
pub(crate) fn prompt_until<T>(
    label: &str,
    preset: Option<String>,
    parse: impl Fn(&str) -> Result<T, InputError>,
) -> Result<T> {
    if let Some(value) = preset {
        return Ok(parse(&value)?);
    }
    loop {
        let answer = prompt_line(label)?;
        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(e) => eprintln!("  {e}"),
        }
    }
}

pub(crate) fn print_food_table(foods: &[FoodCatalogItem]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Cal/100g")]
        calories: String,
        #[tabled(rename = "P/100g")]
        protein: String,
        #[tabled(rename = "C/100g")]
        carbs: String,
        #[tabled(rename = "F/100g")]
        fat: String,
        #[tabled(rename = "Fib/100g")]
        fiber: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .map(|f| FoodRow {
            name: truncate(&f.name, 30),
            category: if f.is_custom {
                format!("{} *", f.category)
            } else {
                f.category.clone()
            },
            calories: format!("{:.0}", f.calories_per_100g),
            protein: format!("{:.1}", f.protein_per_100g),
            carbs: format!("{:.1}", f.carbs_per_100g),
            fat: format!("{:.1}", f.fat_per_100g),
            fiber: format!("{:.1}", f.fiber_per_100g),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn format_entry(e: &FoodLogEntry) -> String {
    let id = e.id;
    let name = &e.food_name;
    let quantity = format_quantity(e.quantity);
    let unit = &e.unit;
    let n = &e.nutrition;
    let (cal, p, c, f) = (
        no_neg_zero(n.calories),
        no_neg_zero(n.protein),
        no_neg_zero(n.carbs),
        no_neg_zero(n.fat),
    );
    format!("[{id}] {name}, {quantity} {unit}: {cal:.0} kcal | P:{p:.1}g C:{c:.1}g F:{f:.1}g")
}

pub(crate) fn format_quantity(q: f64) -> String {
    if q.fract() == 0.0 {
        format!("{q:.0}")
    } else {
        format!("{q}")
    }
}

/// Report a missing record and exit with status 2.
pub(crate) fn exit_not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

pub(crate) fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::Read::read_to_string(&mut io::stdin(), &mut buf)?;
        return Ok(buf);
    }
    if !std::path::Path::new(path).exists() {
        bail!("File not found: {path}");
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thali_core::models::parse_positive;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_resolve_logged_at_keeps_date() {
        let at = resolve_logged_at(Some("2024-03-09".to_string())).unwrap();
        assert_eq!(at.date(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn test_parse_meal() {
        assert_eq!(parse_meal(None).unwrap(), None);
        assert_eq!(parse_meal(Some("Lunch")).unwrap(), Some(MealType::Lunch));
        assert!(parse_meal(Some("brunch")).is_err());
    }

    #[test]
    fn test_prompt_until_uses_preset() {
        let v = prompt_until("Weight", Some("72.5".to_string()), |s| {
            parse_positive("weight", s)
        })
        .unwrap();
        assert!((v - 72.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prompt_until_rejects_bad_preset() {
        let err = prompt_until("Weight", Some("heavy".to_string()), |s| {
            parse_positive("weight", s)
        })
        .unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(1.5), "1.5");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("Entry 4 not found"), r#"{"error":"Entry 4 not found"}"#);
    }
}
