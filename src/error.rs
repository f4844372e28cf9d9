use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("input file {} not found", .0.display())]
    FileNotFound(PathBuf),

    /// A record's date is missing or matches none of the configured formats.
    #[error("invalid date {0:?}")]
    InvalidDate(String),

    /// A running total left the range of its numeric type.
    #[error("{0} total overflowed")]
    Overflow(&'static str),

    #[error("failed to read sales data: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
