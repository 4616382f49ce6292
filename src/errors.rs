use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Invariant a recurrence rule failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("frequency interval must be at least 1")]
    ZeroInterval,
    #[error("occurrence count must be at least 1 when the rule ends after occurrences")]
    ZeroOccurrences,
    #[error("reminder lead time of {0} days is outside 0..=14")]
    ReminderOutOfRange(u32),
    #[error("custom frequency requires an explicit unit")]
    MissingCustomUnit,
    #[error("custom unit is only valid with a custom frequency")]
    UnexpectedCustomUnit,
}

/// Errors raised by recurrence rules and the schedules that own them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(#[from] RuleViolation),
    #[error("{date} is not an occurrence of this schedule")]
    InvalidDate { date: NaiveDate },
    #[error("expected occurrence #{expected} but {date} is occurrence #{actual}")]
    OutOfSequence {
        date: NaiveDate,
        expected: u32,
        actual: u32,
    },
    #[error("schedule {0} has no remaining occurrences")]
    Exhausted(Uuid),
    #[error("schedule {0} is paused")]
    Paused(Uuid),
    #[error("schedule {0} not found")]
    UnknownSchedule(Uuid),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failures reading or writing schedule books on disk.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("schedule id {0} appears more than once")]
    DuplicateSchedule(Uuid),
}
