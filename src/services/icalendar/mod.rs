//! RFC 5545 (.ics) import/export service.

mod export;
mod import;
mod service;
mod utils;

pub use export::PRODUCT_ID;
pub use service::{from_ics, from_ics_at, to_ics, to_ics_at, ICalendarService};
