//! Recurring schedules: rules, the transactions that own them, and evaluation.

pub mod evaluator;
pub mod frequency;
pub mod rule;
pub mod transaction;

pub use evaluator::{
    apply_actions, due_actions, snapshot_schedules, EvaluatorSettings, ScheduleAction,
    ScheduleEvaluator, ScheduleSnapshot, ScheduledStatus,
};
pub use frequency::{FrequencyType, TimeInterval, TimeUnit};
pub use rule::{
    EndCondition, Occurrences, RecurrenceRule, RecurrenceRuleBuilder, RuleChange, RuleUpdate,
    MAX_REMINDER_DAYS,
};
pub use transaction::{ScheduleStatus, ScheduledTransaction};
