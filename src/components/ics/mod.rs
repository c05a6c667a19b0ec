pub mod models;
mod parser;

pub use models::CalendarEvent;
pub use parser::{extract_events, serialize_events};
