use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("SLACK_TOKEN environment variable not set")]
    MissingToken,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid date format: {0}")]
    InvalidDate(String),

    #[error("invalid Slack timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("Slack authentication failed: {0}")]
    SlackAuth(String),

    #[error("no user group with handle @{0}")]
    UsergroupNotFound(String),

    #[error("thread {thread_ts} in channel {channel} returned no messages")]
    EmptyThread { channel: String, thread_ts: String },

    #[error("failed to read file at {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file at {path}: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
