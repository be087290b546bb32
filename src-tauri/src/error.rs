//! Error types shared by the store, the router and the page handlers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Incorrect password.")]
    Auth,

    #[error("failed to read {}: {source}", path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed submissions file at line {line}: {reason}")]
    MalformedStore { line: usize, reason: String },

    #[error("failed to write {}: {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("action `{action}` is not available on the {page} page")]
    InvalidAction { action: &'static str, page: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Auth => "auth",
            Self::StoreRead { .. } => "store_read",
            Self::MalformedStore { .. } => "malformed_store",
            Self::StoreWrite { .. } => "store_write",
            Self::InvalidAction { .. } => "invalid_action",
            Self::Config(_) => "config",
        }
    }

    /// The form field an error belongs to, if it is an inline validation error.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}
