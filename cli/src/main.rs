mod commands;
mod config;
mod logging;
mod reminder_store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    CustomFoodArgs, EditArgs, LogArgs, ManualArgs, ProfileArgs, ScanArgs, cmd_add, cmd_delete,
    cmd_edit, cmd_export, cmd_food_add, cmd_food_categories, cmd_food_estimate, cmd_food_import,
    cmd_food_list, cmd_food_search, cmd_import, cmd_log, cmd_profile_setup, cmd_profile_show,
    cmd_profile_update, cmd_remind_check, cmd_remind_disable, cmd_remind_enable, cmd_remind_list,
    cmd_scan, cmd_streak, cmd_suggest, cmd_summary, cmd_week,
};
use crate::config::Config;
use crate::reminder_store::FileScheduler;
use thali_core::service::ThaliService;

#[derive(Parser)]
#[command(
    name = "thali",
    version,
    about = "A local-first calorie and nutrition tracker for Indian home food"
)]
struct Cli {
    /// Increase log output (-v info, -vv debug). Overrides THALI_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up, show or update your profile and calorie goal
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Log a food by name (e.g. `thali log "Masala Dosa" 1 piece`)
    Log {
        /// Food name, matched against the catalog and your custom foods
        food: String,
        /// Quantity (e.g. 2, 1.5, 150)
        quantity: String,
        /// Unit: piece, cup, bowl, g, 100g, ...
        #[arg(default_value = "100g")]
        unit: String,
        /// Meal type: breakfast, lunch, dinner, snack (default: by time of day)
        #[arg(short, long)]
        meal: Option<String>,
        /// Date to log for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Free-form note
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a food with nutrition you enter yourself (prompts for missing values)
    Add {
        /// Food name
        #[arg(long)]
        name: Option<String>,
        /// Portion size in grams
        #[arg(long)]
        portion: Option<String>,
        /// Calories for the portion
        #[arg(long)]
        calories: Option<String>,
        #[arg(long)]
        protein: Option<String>,
        #[arg(long)]
        carbs: Option<String>,
        #[arg(long)]
        fat: Option<String>,
        #[arg(long)]
        fiber: Option<String>,
        /// Also save the food (per 100 g) for future logging
        #[arg(long)]
        save: bool,
        /// Meal type: breakfast, lunch, dinner, snack (default: by time of day)
        #[arg(short, long)]
        meal: Option<String>,
        /// Date to log for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Guess a food from a meal photo (simulated: picks a catalog item)
    Scan {
        /// Log the guessed food
        #[arg(long)]
        log: bool,
        /// Quantity to log
        #[arg(long, default_value = "1")]
        quantity: String,
        /// Unit to log
        #[arg(long, default_value = "100g")]
        unit: String,
        /// Seed for a reproducible guess
        #[arg(long)]
        seed: Option<u64>,
        #[arg(short, long)]
        meal: Option<String>,
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a logged entry
    Edit {
        /// Entry ID
        entry_id: i64,
        /// New quantity (nutrition is recalculated)
        #[arg(long)]
        quantity: Option<String>,
        /// New unit (nutrition is recalculated)
        #[arg(long)]
        unit: Option<String>,
        #[arg(short, long)]
        meal: Option<String>,
        /// Move to another date (YYYY-MM-DD, today, yesterday)
        #[arg(long)]
        date: Option<String>,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
        /// Override calories (and optionally macros) instead of recalculating
        #[arg(long)]
        calories: Option<String>,
        #[arg(long)]
        protein: Option<String>,
        #[arg(long)]
        carbs: Option<String>,
        #[arg(long)]
        fat: Option<String>,
        #[arg(long)]
        fiber: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a logged entry
    Delete {
        /// Entry ID
        entry_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the daily summary
    Summary {
        /// Date (YYYY-MM-DD, today, yesterday; default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show seven days of totals
    Week {
        /// First day (default: six days ago)
        start: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show consecutive days with at least one entry
    Streak {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse the food catalog and manage custom foods
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Suggest food names for a partial query
    Suggest {
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage meal reminders
    Remind {
        #[command(subcommand)]
        command: RemindCommands,
    },
    /// Export all data as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Output a JSON summary when writing to a file
        #[arg(long)]
        json: bool,
    },
    /// Import data from a JSON export (`-` reads stdin). Existing data is kept.
    Import {
        input: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create your profile (prompts for missing values)
    Setup {
        #[arg(long)]
        name: Option<String>,
        /// Height in cm
        #[arg(long)]
        height: Option<String>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        age: Option<String>,
        /// male, female or other
        #[arg(long)]
        gender: Option<String>,
        /// sedentary, light, moderate, active, very active
        #[arg(long)]
        activity: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show your profile and calorie goal
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change profile values; BMR and goal are recalculated
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        height: Option<String>,
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        activity: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// List foods, optionally in one category
    List {
        #[arg(short, long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search foods by name or description
    Search {
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List food categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Estimate nutrition without logging
    Estimate {
        food: String,
        quantity: String,
        #[arg(default_value = "100g")]
        unit: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a custom food (values per 100 g)
    Add {
        name: String,
        #[arg(long)]
        calories: String,
        #[arg(long)]
        protein: Option<String>,
        #[arg(long)]
        carbs: Option<String>,
        #[arg(long)]
        fat: Option<String>,
        #[arg(long)]
        fiber: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import custom foods from CSV
    Import {
        /// Path to the CSV file
        file: PathBuf,
        /// Preview without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RemindCommands {
    /// Schedule the daily meal reminders
    Enable {
        /// Also schedule a motivational message later today
        #[arg(long)]
        motivation: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show scheduled reminders
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cancel all reminders
    Disable {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check calorie progress and show a goal notification if one is due
    Check {
        /// Date (default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(path = %config.db_path.display(), "opening database");
    let svc = ThaliService::new(&config.db_path)?;

    match cli.command {
        Commands::Profile { command } => match command {
            ProfileCommands::Setup {
                name,
                height,
                weight,
                age,
                gender,
                activity,
                json,
            } => {
                let args = ProfileArgs {
                    name,
                    height,
                    weight,
                    age,
                    gender,
                    activity,
                };
                cmd_profile_setup(&svc, args, json)
            }
            ProfileCommands::Show { json } => cmd_profile_show(&svc, json),
            ProfileCommands::Update {
                name,
                height,
                weight,
                age,
                gender,
                activity,
                json,
            } => {
                let args = ProfileArgs {
                    name,
                    height,
                    weight,
                    age,
                    gender,
                    activity,
                };
                cmd_profile_update(&svc, args, json)
            }
        },
        Commands::Log {
            food,
            quantity,
            unit,
            meal,
            date,
            notes,
            json,
        } => {
            let args = LogArgs { meal, date, notes };
            cmd_log(&svc, &food, &quantity, &unit, args, json)
        }
        Commands::Add {
            name,
            portion,
            calories,
            protein,
            carbs,
            fat,
            fiber,
            save,
            meal,
            date,
            notes,
            json,
        } => {
            let manual = ManualArgs {
                name,
                portion,
                calories,
                protein,
                carbs,
                fat,
                fiber,
                save,
            };
            cmd_add(&svc, manual, LogArgs { meal, date, notes }, json)
        }
        Commands::Scan {
            log,
            quantity,
            unit,
            seed,
            meal,
            date,
            json,
        } => {
            let scan = ScanArgs {
                seed,
                log,
                quantity,
                unit,
            };
            let args = LogArgs {
                meal,
                date,
                notes: None,
            };
            cmd_scan(&svc, scan, args, json)
        }
        Commands::Edit {
            entry_id,
            quantity,
            unit,
            meal,
            date,
            notes,
            clear_notes,
            calories,
            protein,
            carbs,
            fat,
            fiber,
            json,
        } => {
            let args = EditArgs {
                quantity,
                unit,
                meal,
                date,
                notes,
                clear_notes,
                calories,
                protein,
                carbs,
                fat,
                fiber,
            };
            cmd_edit(&svc, entry_id, args, json)
        }
        Commands::Delete { entry_id, json } => cmd_delete(&svc, entry_id, json),
        Commands::Summary { date, json } => cmd_summary(&svc, date, json),
        Commands::Week { start, json } => cmd_week(&svc, start, json),
        Commands::Streak { json } => cmd_streak(&svc, json),
        Commands::Food { command } => match command {
            FoodCommands::List { category, json } => {
                cmd_food_list(&svc, category.as_deref(), json)
            }
            FoodCommands::Search { query, json } => cmd_food_search(&svc, &query, json),
            FoodCommands::Categories { json } => cmd_food_categories(&svc, json),
            FoodCommands::Estimate {
                food,
                quantity,
                unit,
                json,
            } => cmd_food_estimate(&svc, &food, &quantity, &unit, json),
            FoodCommands::Add {
                name,
                calories,
                protein,
                carbs,
                fat,
                fiber,
                category,
                description,
                json,
            } => {
                let args = CustomFoodArgs {
                    name,
                    calories,
                    protein,
                    carbs,
                    fat,
                    fiber,
                    category,
                    description,
                };
                cmd_food_add(&svc, args, json)
            }
            FoodCommands::Import {
                file,
                dry_run,
                json,
            } => cmd_food_import(&svc, &file, dry_run, json),
        },
        Commands::Suggest { query, json } => cmd_suggest(&svc, &query, json),
        Commands::Remind { command } => {
            let mut scheduler = FileScheduler::open(&config.reminders_path)?;
            match command {
                RemindCommands::Enable { motivation, json } => {
                    cmd_remind_enable(&svc, &mut scheduler, motivation, json)
                }
                RemindCommands::List { json } => cmd_remind_list(&scheduler, json),
                RemindCommands::Disable { json } => cmd_remind_disable(&svc, &mut scheduler, json),
                RemindCommands::Check { date, json } => {
                    cmd_remind_check(&svc, &mut scheduler, date, json)
                }
            }
        }
        Commands::Export { output, json } => cmd_export(&svc, output.as_deref(), json),
        Commands::Import { input, json } => cmd_import(&svc, &input, json),
    }
}
