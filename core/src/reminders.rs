use anyhow::Result;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::GoalProgress;

pub const MEAL_REMINDER_CATEGORY: &str = "MEAL_REMINDER";

/// Calorie progress at which the "almost there" nudge fires.
pub const ALMOST_THERE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Every day at the given wall-clock time.
    Daily { hour: u32, minute: u32 },
    /// Next occurrence of the given time, then discarded.
    Once { hour: u32, minute: u32 },
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub trigger: Trigger,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<String>,
}

impl Reminder {
    #[must_use]
    pub fn repeats(&self) -> bool {
        matches!(self.trigger, Trigger::Daily { .. })
    }
}

/// Platform notification backend.
pub trait ReminderScheduler {
    /// Adds `reminder`, replacing any pending one with the same identifier.
    fn schedule(&mut self, reminder: Reminder) -> Result<()>;
    fn cancel_all(&mut self) -> Result<()>;
    fn pending(&self) -> Result<Vec<Reminder>>;
}

fn meal_reminder(identifier: &str, title: &str, body: &str, hour: u32, minute: u32) -> Reminder {
    Reminder {
        identifier: identifier.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        trigger: Trigger::Daily { hour, minute },
        category: Some(MEAL_REMINDER_CATEGORY.to_string()),
    }
}

#[must_use]
pub fn default_meal_reminders() -> Vec<Reminder> {
    vec![
        meal_reminder(
            "breakfast",
            "Good Morning! 🌅",
            "Time to fuel your day with a nutritious breakfast",
            8,
            0,
        ),
        meal_reminder(
            "lunch",
            "Lunch Time! 🍽️",
            "Don't forget to log your midday meal",
            13,
            0,
        ),
        meal_reminder(
            "dinner",
            "Dinner Time! 🌙",
            "End your day with a balanced dinner",
            19,
            30,
        ),
        meal_reminder(
            "evening_log",
            "Daily Check-in 📊",
            "How did your nutrition goals go today?",
            21,
            0,
        ),
    ]
}

const MOTIVATIONAL_MESSAGES: [&str; 5] = [
    "You're doing great! Keep up the healthy eating! 💪",
    "Small steps lead to big changes. Log your next meal! 🌟",
    "Your body is your temple. Nourish it well! 🏛️",
    "Consistency is key to reaching your goals! 🎯",
    "Every healthy choice counts. You've got this! ✨",
];

/// One-off encouragement at a random time between 10:00 and 18:59.
pub fn motivational_reminder<R: Rng + ?Sized>(rng: &mut R) -> Reminder {
    let body = MOTIVATIONAL_MESSAGES
        .choose(rng)
        .copied()
        .unwrap_or("Keep tracking your nutrition!");
    Reminder {
        identifier: format!("motivation_{}", Uuid::new_v4()),
        title: "Stay Motivated! 🎉".to_string(),
        body: body.to_string(),
        trigger: Trigger::Once {
            hour: rng.random_range(10..=18),
            minute: rng.random_range(0..=59),
        },
        category: None,
    }
}

#[must_use]
pub fn goal_notification(goal_type: &str, achieved: bool) -> Reminder {
    let (title, body) = if achieved {
        (
            "Goal Achieved! 🎉",
            format!("Congratulations! You've reached your {goal_type} goal today!"),
        )
    } else {
        (
            "Almost There! 💪",
            format!("You're close to your {goal_type} goal. Keep going!"),
        )
    };
    Reminder {
        identifier: format!("goal_{}", Uuid::new_v4()),
        title: title.to_string(),
        body,
        trigger: Trigger::Immediate,
        category: None,
    }
}

/// Calorie goal notification for the day's progress, if any is due.
#[must_use]
pub fn calorie_goal_check(progress: &GoalProgress) -> Option<Reminder> {
    if progress.goals.calories <= 0 {
        return None;
    }
    if progress.calorie_progress >= 1.0 {
        Some(goal_notification("calorie", true))
    } else if progress.calorie_progress >= ALMOST_THERE_RATIO {
        Some(goal_notification("calorie", false))
    } else {
        None
    }
}

/// Scheduler that only keeps reminders in memory.
#[derive(Debug, Default)]
pub struct InMemoryScheduler {
    reminders: Vec<Reminder>,
}

impl InMemoryScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReminderScheduler for InMemoryScheduler {
    fn schedule(&mut self, reminder: Reminder) -> Result<()> {
        self.reminders.retain(|r| r.identifier != reminder.identifier);
        self.reminders.push(reminder);
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<()> {
        self.reminders.clear();
        Ok(())
    }

    fn pending(&self) -> Result<Vec<Reminder>> {
        Ok(self.reminders.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::goal_progress;
    use crate::models::NutritionData;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_default_reminders() {
        let reminders = default_meal_reminders();
        let times: Vec<(&str, Trigger)> = reminders
            .iter()
            .map(|r| (r.identifier.as_str(), r.trigger))
            .collect();
        assert_eq!(
            times,
            vec![
                ("breakfast", Trigger::Daily { hour: 8, minute: 0 }),
                ("lunch", Trigger::Daily { hour: 13, minute: 0 }),
                ("dinner", Trigger::Daily { hour: 19, minute: 30 }),
                ("evening_log", Trigger::Daily { hour: 21, minute: 0 }),
            ]
        );
        assert!(reminders.iter().all(Reminder::repeats));
    }

    #[test]
    fn test_schedule_replaces_same_identifier() {
        let mut scheduler = InMemoryScheduler::new();
        for r in default_meal_reminders() {
            scheduler.schedule(r).unwrap();
        }
        scheduler.schedule(default_meal_reminders()[0].clone()).unwrap();
        assert_eq!(scheduler.pending().unwrap().len(), 4);

        scheduler.cancel_all().unwrap();
        assert!(scheduler.pending().unwrap().is_empty());
    }

    #[test]
    fn test_goal_check_thresholds() {
        let at = |calories: f64| {
            let progress = goal_progress(&NutritionData::new(calories, 0.0, 0.0, 0.0, 0.0), 2000);
            calorie_goal_check(&progress)
        };
        assert!(at(1500.0).is_none());
        assert_eq!(at(1600.0).unwrap().title, "Almost There! 💪");
        assert_eq!(at(2000.0).unwrap().title, "Goal Achieved! 🎉");
        assert_eq!(
            at(2400.0).unwrap().body,
            "Congratulations! You've reached your calorie goal today!"
        );
    }

    #[test]
    fn test_goal_notification_is_immediate() {
        let r = goal_notification("protein", false);
        assert_eq!(r.trigger, Trigger::Immediate);
        assert!(r.identifier.starts_with("goal_"));
        assert_eq!(r.body, "You're close to your protein goal. Keep going!");
    }

    #[test]
    fn test_motivational_reminder_window() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let r = motivational_reminder(&mut rng);
            match r.trigger {
                Trigger::Once { hour, minute } => {
                    assert!((10..=18).contains(&hour));
                    assert!(minute <= 59);
                }
                other => panic!("unexpected trigger {other:?}"),
            }
            assert!(MOTIVATIONAL_MESSAGES.contains(&r.body.as_str()));
            assert!(!r.repeats());
        }
    }
}
