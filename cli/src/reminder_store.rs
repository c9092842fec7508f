use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use thali_core::reminders::{Reminder, ReminderScheduler, Trigger};

/// Reminders persisted as JSON in the data directory.
///
/// Immediate notifications are shown by the command that raised them and
/// are not written to disk.
pub struct FileScheduler {
    path: PathBuf,
    reminders: Vec<Reminder>,
}

impl FileScheduler {
    pub fn open(path: &Path) -> Result<Self> {
        let reminders = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read reminders: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid reminders file: {}", path.display()))?
        } else {
            Vec::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            reminders,
        })
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.reminders)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write reminders: {}", self.path.display()))
    }
}

impl ReminderScheduler for FileScheduler {
    fn schedule(&mut self, reminder: Reminder) -> Result<()> {
        if reminder.trigger == Trigger::Immediate {
            debug!(id = %reminder.identifier, "immediate reminder, not persisted");
            return Ok(());
        }
        self.reminders.retain(|r| r.identifier != reminder.identifier);
        self.reminders.push(reminder);
        self.save()
    }

    fn cancel_all(&mut self) -> Result<()> {
        self.reminders.clear();
        self.save()
    }

    fn pending(&self) -> Result<Vec<Reminder>> {
        Ok(self.reminders.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thali_core::reminders::{default_meal_reminders, goal_notification};

    #[test]
    fn test_reminders_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reminders.json");

        let mut scheduler = FileScheduler::open(&path).unwrap();
        assert!(scheduler.pending().unwrap().is_empty());
        for r in default_meal_reminders() {
            scheduler.schedule(r).unwrap();
        }

        let reopened = FileScheduler::open(&path).unwrap();
        let pending = reopened.pending().unwrap();
        assert_eq!(pending.len(), 4);
        assert_eq!(pending[3].identifier, "evening_log");
    }

    #[test]
    fn test_cancel_all_clears_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reminders.json");

        let mut scheduler = FileScheduler::open(&path).unwrap();
        scheduler.schedule(default_meal_reminders()[0].clone()).unwrap();
        scheduler.cancel_all().unwrap();

        assert!(FileScheduler::open(&path).unwrap().pending().unwrap().is_empty());
    }

    #[test]
    fn test_immediate_reminders_not_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reminders.json");

        let mut scheduler = FileScheduler::open(&path).unwrap();
        scheduler.schedule(goal_notification("calorie", true)).unwrap();
        assert!(scheduler.pending().unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reminders.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileScheduler::open(&path).is_err());
    }
}
