// Service module exports

pub mod availability;
pub mod database;
pub mod icalendar;
pub mod interaction;
pub mod quick_entry;
pub mod settings;
pub mod store;
