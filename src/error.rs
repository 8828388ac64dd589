use thiserror::Error;

use crate::roster::RosterError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("Roster store is not running")]
    StoreUnavailable,

    #[error("Discord error: {0}")]
    Discord(Box<serenity::Error>),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::Discord(Box::new(err))
    }
}

impl AppError {
    /// Whether the error was caused by the request itself rather than by the bot.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, AppError::Roster(_))
    }
}
