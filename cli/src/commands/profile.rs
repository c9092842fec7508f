use anyhow::{Result, bail};

use thali_core::models::{
    ActivityLevel, Gender, InputError, NewProfile, UpdateProfile, UserProfile, parse_positive,
    parse_positive_whole,
};
use thali_core::service::ThaliService;

use super::helpers::{exit_not_found, prompt_until};

/// Profile fields supplied on the command line; missing ones are prompted for.
pub(crate) struct ProfileArgs {
    pub name: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub activity: Option<String>,
}

fn parse_name(s: &str) -> Result<String, InputError> {
    let name = s.trim();
    if name.is_empty() {
        return Err(InputError::Empty { field: "name" });
    }
    Ok(name.to_string())
}

pub(crate) fn cmd_profile_setup(svc: &ThaliService, args: ProfileArgs, json: bool) -> Result<()> {
    if svc.get_profile()?.is_some() {
        bail!("A profile already exists. Use `thali profile update` to change it");
    }

    if args.activity.is_none() {
        eprintln!("Activity levels:");
        for level in ActivityLevel::ALL {
            eprintln!("  {:<12} {}", level.as_str(), level.description());
        }
    }

    let profile = NewProfile {
        name: prompt_until("Name", args.name, parse_name)?,
        height_cm: prompt_until("Height (cm)", args.height, |s| parse_positive("height", s))?,
        weight_kg: prompt_until("Weight (kg)", args.weight, |s| parse_positive("weight", s))?,
        age: prompt_until("Age", args.age, |s| parse_positive_whole("age", s))?,
        gender: prompt_until("Gender (male/female/other)", args.gender, |s| {
            Ok(Gender::from_label(s))
        })?,
        activity_level: prompt_until("Activity level", args.activity, |s| {
            s.parse::<ActivityLevel>()
        })?,
    };

    let saved = svc.setup_profile(&profile)?;
    print_profile(&saved, json)
}

pub(crate) fn cmd_profile_show(svc: &ThaliService, json: bool) -> Result<()> {
    let Some(profile) = svc.get_profile()? else {
        exit_not_found("No profile found. Run `thali profile setup` first", json);
    };
    print_profile(&profile, json)
}

pub(crate) fn cmd_profile_update(svc: &ThaliService, args: ProfileArgs, json: bool) -> Result<()> {
    let update = UpdateProfile {
        name: args.name.as_deref().map(parse_name).transpose()?,
        height_cm: args
            .height
            .as_deref()
            .map(|s| parse_positive("height", s))
            .transpose()?,
        weight_kg: args
            .weight
            .as_deref()
            .map(|s| parse_positive("weight", s))
            .transpose()?,
        age: args
            .age
            .as_deref()
            .map(|s| parse_positive_whole("age", s))
            .transpose()?,
        gender: args.gender.as_deref().map(Gender::from_label),
        activity_level: args
            .activity
            .as_deref()
            .map(str::parse::<ActivityLevel>)
            .transpose()?,
    };

    if update.is_empty() {
        bail!(
            "Nothing to update. Provide --name, --height, --weight, --age, --gender or --activity"
        );
    }
    if svc.get_profile()?.is_none() {
        exit_not_found("No profile found. Run `thali profile setup` first", json);
    }

    let saved = svc.update_profile(&update)?;
    print_profile(&saved, json)
}

fn print_profile(p: &UserProfile, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(p)?);
        return Ok(());
    }

    let name = &p.name;
    let height = p.height_cm;
    let weight = p.weight_kg;
    let age = p.age;
    let gender = p.gender;
    let activity = p.activity_level;
    let bmr = p.bmr;
    let goal = p.daily_calorie_goal;
    println!("{name}");
    println!("  Height:    {height:.1} cm");
    println!("  Weight:    {weight:.1} kg");
    println!("  Age:       {age}");
    println!("  Gender:    {gender}");
    println!("  Activity:  {activity} ({})", activity.description());
    println!("  BMR:       {bmr:.0} kcal");
    println!("  Goal:      {goal} kcal/day");
    Ok(())
}
