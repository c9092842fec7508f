use std::path::Path;

use anyhow::{Context, Result};

use thali_core::models::ExportData;
use thali_core::service::ThaliService;

use super::helpers::read_input;

/// Write all data as JSON to `output`, or to stdout when no file is given.
pub(crate) fn cmd_export(svc: &ThaliService, output: Option<&Path>, json: bool) -> Result<()> {
    let data = svc.export_all()?;
    let body = serde_json::to_string_pretty(&data)?;

    let Some(path) = output else {
        println!("{body}");
        return Ok(());
    };

    std::fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "path": path.display().to_string(),
                "entries": data.entries.len(),
                "custom_foods": data.custom_foods.len(),
                "profile": data.profile.is_some(),
            })
        );
    } else {
        let entries = data.entries.len();
        let foods = data.custom_foods.len();
        println!(
            "Exported {entries} entries and {foods} custom foods to {}",
            path.display()
        );
    }
    Ok(())
}

pub(crate) fn cmd_import(svc: &ThaliService, input: &str, json: bool) -> Result<()> {
    let raw = read_input(input)?;
    let data: ExportData = serde_json::from_str(&raw).context("Invalid export file")?;
    let summary = svc.import_all(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Import complete.\n");
    println!(
        "  Profile:      {}",
        if summary.profile_imported {
            "imported"
        } else {
            "kept existing"
        }
    );
    println!(
        "  Entries:      {} imported, {} already present",
        summary.entries_imported, summary.entries_skipped
    );
    println!(
        "  Custom foods: {} imported, {} already present",
        summary.custom_foods_imported, summary.custom_foods_skipped
    );
    if summary.rows_rejected > 0 {
        println!(
            "  Rejected:     {} invalid rows skipped",
            summary.rows_rejected
        );
    }
    Ok(())
}
