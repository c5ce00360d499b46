//! Time expressions: parsing user input and rendering timestamps

pub mod format;
pub mod parser;

pub use format::{format_timestamp, DateFormat};
pub use parser::{parse, parse_at, ParseFailure};
