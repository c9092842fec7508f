use std::collections::HashSet;
use std::io::Read;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use crate::catalog::FoodCatalog;
use crate::db::Database;
use crate::models::{NewCustomFood, NutritionData};

/// A custom food parsed from CSV. All values are per 100 g.
#[derive(Debug, Clone)]
pub struct FoodCsvRow {
    pub name: String,
    pub category: Option<String>,
    pub nutrition: NutritionData,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodImportSummary {
    pub rows_parsed: usize,
    pub foods_created: usize,
    /// Names already present as a custom or built-in food.
    pub foods_skipped: usize,
}

/// Parse custom foods from CSV.
///
/// Expected header:
/// `Name,Category,Calories,Protein (g),Carbs (g),Fat (g),Fiber (g),Description`
///
/// Only `Name` and `Calories` are required; missing macro cells count as 0.
pub fn parse_food_csv<R: Read>(reader: R) -> Result<Vec<FoodCsvRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();

    for name in ["Name", "Calories"] {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(name)) {
            bail!("Missing required column: {name}");
        }
    }

    let col = |names: &[&str]| -> Option<usize> {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };

    let idx_name = col(&["Name"]).context("Missing 'Name' column")?;
    let idx_cal = col(&["Calories"]).context("Missing 'Calories' column")?;
    let idx_category = col(&["Category"]);
    let idx_protein = col(&["Protein (g)", "Protein"]);
    let idx_carbs = col(&["Carbs (g)", "Carbohydrates (g)", "Carbs"]);
    let idx_fat = col(&["Fat (g)", "Fat"]);
    let idx_fiber = col(&["Fiber (g)", "Fiber"]);
    let idx_description = col(&["Description"]);

    let mut rows = Vec::new();

    for (line_num, result) in rdr.records().enumerate() {
        let line = line_num + 2;
        let record = result.with_context(|| format!("Failed to parse CSV row {line}"))?;

        let name = record.get(idx_name).unwrap_or("").trim().to_string();
        if name.is_empty() {
            continue;
        }

        let number = |idx: Option<usize>, column: &str| -> Result<f64> {
            let Some(raw) = idx.and_then(|i| record.get(i)).map(str::trim) else {
                return Ok(0.0);
            };
            if raw.is_empty() {
                return Ok(0.0);
            }
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
                _ => bail!("Row {line}: invalid {column} value '{raw}'"),
            }
        };

        let text = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let nutrition = NutritionData::new(
            number(Some(idx_cal), "Calories")?,
            number(idx_protein, "Protein")?,
            number(idx_carbs, "Carbs")?,
            number(idx_fat, "Fat")?,
            number(idx_fiber, "Fiber")?,
        );

        rows.push(FoodCsvRow {
            name,
            category: text(idx_category),
            nutrition,
            description: text(idx_description),
        });
    }

    Ok(rows)
}

/// Store parsed rows as custom foods. Nothing is written when `dry_run` is set.
pub fn import_custom_foods(
    db: &Database,
    catalog: &dyn FoodCatalog,
    rows: &[FoodCsvRow],
    dry_run: bool,
) -> Result<FoodImportSummary> {
    let mut foods_created: usize = 0;
    let mut foods_skipped: usize = 0;
    let mut seen: HashSet<String> = HashSet::new();

    for row in rows {
        let key = row.name.to_lowercase();
        let exists = !seen.insert(key)
            || catalog.find(&row.name).is_some()
            || db.find_custom_food(&row.name)?.is_some();
        if exists {
            foods_skipped += 1;
            continue;
        }

        if !dry_run {
            db.insert_custom_food(&NewCustomFood {
                name: row.name.clone(),
                category: row.category.clone(),
                per_100g: row.nutrition,
                description: row.description.clone(),
            })?;
        }
        foods_created += 1;
    }

    info!(
        created = foods_created,
        skipped = foods_skipped,
        dry_run,
        "custom food import finished"
    );
    Ok(FoodImportSummary {
        rows_parsed: rows.len(),
        foods_created,
        foods_skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::models::CUSTOM_FOOD_CATEGORY;

    const SAMPLE_CSV: &str = "\
Name,Category,Calories,Protein (g),Carbs (g),Fat (g),Fiber (g),Description
Ragi Mudde,Breakfast,115,3,24,0.5,3.6,Finger millet dumpling
Kothu Parotta,,210,7,28,8,2,
Sambar,Curry,85,4.5,15,1,4,Duplicate of a built-in
";

    #[test]
    fn test_parse_food_csv_basic() {
        let rows = parse_food_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "Ragi Mudde");
        assert_eq!(rows[0].category.as_deref(), Some("Breakfast"));
        assert!((rows[0].nutrition.calories - 115.0).abs() < f64::EPSILON);
        assert!((rows[0].nutrition.fiber - 3.6).abs() < f64::EPSILON);
        assert_eq!(rows[0].description.as_deref(), Some("Finger millet dumpling"));
        assert!(rows[1].category.is_none());
        assert!(rows[1].description.is_none());
    }

    #[test]
    fn test_parse_food_csv_missing_required_column() {
        let result = parse_food_csv("Name,Protein\nTofu,8\n".as_bytes());
        assert!(result.unwrap_err().to_string().contains("Calories"));
    }

    #[test]
    fn test_parse_food_csv_minimal_columns() {
        let rows = parse_food_csv("name,calories\nTofu,76\n,\n".as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].nutrition.protein).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_food_csv_rejects_bad_number() {
        let err = parse_food_csv("Name,Calories\nTofu,lots\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Row 2"));
        assert!(parse_food_csv("Name,Calories\nTofu,-5\n".as_bytes()).is_err());
    }

    #[test]
    fn test_import_dry_run_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let catalog = StaticCatalog::new();
        let rows = parse_food_csv(SAMPLE_CSV.as_bytes()).unwrap();

        let summary = import_custom_foods(&db, &catalog, &rows, true).unwrap();
        assert_eq!(summary.rows_parsed, 3);
        assert_eq!(summary.foods_created, 2);
        assert_eq!(summary.foods_skipped, 1);
        assert!(db.list_custom_foods(None).unwrap().is_empty());
    }

    #[test]
    fn test_import_creates_and_skips_duplicates() {
        let db = Database::open_in_memory().unwrap();
        let catalog = StaticCatalog::new();
        let rows = parse_food_csv(SAMPLE_CSV.as_bytes()).unwrap();

        let first = import_custom_foods(&db, &catalog, &rows, false).unwrap();
        assert_eq!(first.foods_created, 2);

        let stored = db.find_custom_food("kothu parotta").unwrap().unwrap();
        assert_eq!(stored.category, CUSTOM_FOOD_CATEGORY);

        let second = import_custom_foods(&db, &catalog, &rows, false).unwrap();
        assert_eq!(second.foods_created, 0);
        assert_eq!(second.foods_skipped, 3);
        assert_eq!(db.list_custom_foods(None).unwrap().len(), 2);
    }
}
