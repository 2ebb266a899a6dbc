//! Unified error type for the cashbook.
//!
//! The first four variants are recoverable, user-facing outcomes that the web
//! layer renders as inline messages. Everything else is infrastructure and is
//! only ever shown to the user as a generic failure.

use thiserror::Error;

/// All errors produced by the cashbook core, configuration and web layers.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more submitted fields are missing, malformed or inconsistent.
    #[error("Validation failed: {}", messages.join("; "))]
    Validation {
        /// One human-readable message per violated rule, in field order
        messages: Vec<String>,
    },

    /// A referenced or addressed row does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Display name of the missing entity kind (e.g. "Category")
        entity: &'static str,
        /// The id that was looked up
        id: i64,
    },

    /// A name collides with an existing sibling in the same scope.
    #[error("{entity} named '{name}' already exists")]
    Conflict {
        /// Display name of the entity kind
        entity: &'static str,
        /// The colliding name
        name: String,
    },

    /// A delete or re-parent is blocked by dependent rows.
    #[error("{message}")]
    DependencyExists {
        /// Explanation shown to the user
        message: String,
    },

    /// The settings file or environment could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading
        message: String,
    },

    /// A query or connection failure from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem or socket failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An environment variable was present but unreadable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serializing data embedded in a page failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation error carrying a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            messages: vec![message.into()],
        }
    }

    /// Returns the inline messages for user-facing variants, or `None` for
    /// infrastructure failures that must not leak details to the user.
    #[must_use]
    pub fn user_messages(&self) -> Option<Vec<String>> {
        match self {
            Self::Validation { messages } => Some(messages.clone()),
            Self::NotFound { .. } | Self::Conflict { .. } | Self::DependencyExists { .. } => {
                Some(vec![self.to_string()])
            }
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Json(_) => None,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_joins_messages() {
        let err = Error::Validation {
            messages: vec!["Date is required".to_string(), "Status is required".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Validation failed: Date is required; Status is required"
        );
    }

    #[test]
    fn test_user_messages_hide_infrastructure_errors() {
        let conflict = Error::Conflict {
            entity: "Status",
            name: "Tax".to_string(),
        };
        assert_eq!(
            conflict.user_messages(),
            Some(vec!["Status named 'Tax' already exists".to_string()])
        );

        let db_err = Error::Database(sea_orm::DbErr::Custom("disk full".to_string()));
        assert!(db_err.user_messages().is_none());
    }
}
