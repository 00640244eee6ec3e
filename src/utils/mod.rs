// Utility module exports
// Pure helpers shared by the scheduling services

pub mod clock;
pub mod date;
pub mod grid;
