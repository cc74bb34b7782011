use chrono::NaiveDate;

pub mod cli;
pub mod commands;
pub mod error;
pub mod filter;
pub mod permalink;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod settings;
pub mod slack;
pub mod thread;
pub mod users;

pub use cli::{Cli, Commands};
pub use error::{AppError, Result};

pub fn load_token() -> Result<String> {
    std::env::var("SLACK_TOKEN").map_err(|_| AppError::MissingToken)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| AppError::InvalidDate(s.to_string()))
}

pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(parse_date).transpose()
}
