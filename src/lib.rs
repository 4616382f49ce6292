#![doc(test(attr(deny(warnings))))]

//! Schedule Core models recurring scheduled transactions for personal-finance
//! tools: validated recurrence rules, occurrence date arithmetic, due and
//! reminder evaluation, typed form validation, and presentation tables.

pub mod catalog;
pub mod config;
pub mod currency;
pub mod errors;
pub mod forms;
pub mod schedule;
pub mod time;
pub mod utils;

pub use errors::{ConfigError, RuleViolation, ScheduleError, StorageError};
pub use schedule::{
    EndCondition, FrequencyType, RecurrenceRule, ScheduleAction, ScheduleEvaluator,
    ScheduledTransaction, TimeUnit,
};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Schedule Core tracing initialized.");
    });
}
