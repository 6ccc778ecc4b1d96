use thiserror::Error;

use crate::category::CategoryKey;

/// Rejected user input. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("enter the amount of hours")]
    EmptyHours,
    #[error("hours must be a positive number, got {0:?}")]
    InvalidHours(String),
    #[error("unknown category: {0:?}")]
    UnknownCategory(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{year}-{month:02} is not a calendar month")]
    InvalidMonth { year: i32, month: u32 },
    #[error("day {day} is outside 1..={days_in_month}")]
    DayOutOfRange { day: u32, days_in_month: u32 },
    #[error("no entry {entry_id} on day {day}")]
    NotFound { day: u32, entry_id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("ceiling for {category} must be a positive number of hours")]
    InvalidCeiling { category: CategoryKey },
    #[error("{category} hours for the month are too large to add up")]
    CategoryTotalOverflow { category: CategoryKey },
    #[error("hours for the month are too large to add up")]
    MonthTotalOverflow,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("intensity thresholds must be non-negative and strictly ascending")]
    InvalidThresholds,
    #[error("unknown category in ceilings: {0:?}")]
    UnknownCategory(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML header: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("failed to encode TOML header: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("failed to parse day record on line {line}: {source}")]
    JsonDecode {
        line: usize,
        source: serde_json::Error,
    },
    #[error("failed to encode day record: {0}")]
    JsonEncode(serde_json::Error),
    #[error("invalid day record: {0}")]
    InvalidRecord(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no signed-in user: pass --user <name> or set LIFE_HEATMAP_USER")]
    SignedOut,
}
