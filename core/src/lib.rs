pub mod catalog;
pub mod db;
pub mod food_import;
pub mod models;
pub mod nutrition;
pub mod recognition;
pub mod reminders;
pub mod service;
