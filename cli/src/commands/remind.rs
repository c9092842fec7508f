use anyhow::Result;

use thali_core::reminders::{Reminder, ReminderScheduler, Trigger};
use thali_core::service::ThaliService;

use super::helpers::parse_date;

fn describe_trigger(trigger: Trigger) -> String {
    match trigger {
        Trigger::Daily { hour, minute } => format!("daily at {hour:02}:{minute:02}"),
        Trigger::Once { hour, minute } => format!("once at {hour:02}:{minute:02}"),
        Trigger::Immediate => "now".to_string(),
    }
}

fn print_reminders(reminders: &[Reminder]) {
    for r in reminders {
        let when = describe_trigger(r.trigger);
        println!("  {when:<16} {}: {}", r.title, r.body);
    }
}

pub(crate) fn cmd_remind_enable(
    svc: &ThaliService,
    scheduler: &mut dyn ReminderScheduler,
    motivation: bool,
    json: bool,
) -> Result<()> {
    let pending = svc.enable_reminders(scheduler, motivation)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
    } else {
        println!("Reminders enabled:");
        print_reminders(&pending);
    }
    Ok(())
}

pub(crate) fn cmd_remind_list(scheduler: &dyn ReminderScheduler, json: bool) -> Result<()> {
    let pending = scheduler.pending()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
    } else if pending.is_empty() {
        println!("No reminders scheduled. Run `thali remind enable` to turn them on");
    } else {
        print_reminders(&pending);
    }
    Ok(())
}

pub(crate) fn cmd_remind_disable(
    svc: &ThaliService,
    scheduler: &mut dyn ReminderScheduler,
    json: bool,
) -> Result<()> {
    svc.disable_reminders(scheduler)?;
    if json {
        println!("{}", serde_json::json!({ "disabled": true }));
    } else {
        println!("All reminders cancelled");
    }
    Ok(())
}

pub(crate) fn cmd_remind_check(
    svc: &ThaliService,
    scheduler: &mut dyn ReminderScheduler,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    if svc.get_profile()?.is_none() {
        eprintln!("No profile found; set one up to track a calorie goal");
    }
    let notification = svc.check_goal(date, scheduler)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notification)?);
        return Ok(());
    }
    match notification {
        Some(r) => println!("{}\n  {}", r.title, r.body),
        None => println!("No goal notification for {date}"),
    }
    Ok(())
}
