// Rust Planner Library
// Scheduling core: time grid, quick entry, free windows, ICS and the event/task store

pub mod models;
pub mod services;
pub mod utils;
