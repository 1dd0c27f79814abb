use thiserror::Error;

/// Errors raised by document validation and external formatters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("certificate name must not be empty")]
    EmptyName,

    #[error("certificate description must not be empty")]
    EmptyDescription,

    #[error("{field} starts at {start} but ends at {end}")]
    InvertedTimeframe {
        field: &'static str,
        start: i64,
        end: i64,
    },

    #[error("certificate lists no contributors")]
    NoContributors,

    #[error("external formatter failed: {0}")]
    Formatter(String),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
