mod entry;
mod food;
mod helpers;
mod log;
mod profile;
mod remind;
mod summary;
mod transfer;

pub(crate) use entry::{EditArgs, cmd_delete, cmd_edit};
pub(crate) use food::{
    CustomFoodArgs, cmd_food_add, cmd_food_categories, cmd_food_estimate, cmd_food_import,
    cmd_food_list, cmd_food_search, cmd_suggest,
};
pub(crate) use log::{LogArgs, ManualArgs, ScanArgs, cmd_add, cmd_log, cmd_scan};
pub(crate) use profile::{ProfileArgs, cmd_profile_setup, cmd_profile_show, cmd_profile_update};
pub(crate) use remind::{cmd_remind_check, cmd_remind_disable, cmd_remind_enable, cmd_remind_list};
pub(crate) use summary::{cmd_streak, cmd_summary, cmd_week};
pub(crate) use transfer::{cmd_export, cmd_import};
