//! Decides which scheduled occurrences are due and which reminders must fire.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use super::transaction::ScheduledTransaction;
use crate::config::Config;
use crate::errors::ScheduleError;
use crate::time::Clock;

pub const MAX_MATERIALIZED_OCCURRENCES: usize = 1024;
pub const PENDING_WINDOW_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledStatus {
    Overdue,
    Pending,
    Future,
}

impl ScheduledStatus {
    pub fn classify(scheduled: NaiveDate, reference: NaiveDate, pending_window_days: u32) -> Self {
        if scheduled < reference {
            return ScheduledStatus::Overdue;
        }
        let pending_cutoff = reference + Duration::days(i64::from(pending_window_days));
        if scheduled <= pending_cutoff {
            ScheduledStatus::Pending
        } else {
            ScheduledStatus::Future
        }
    }
}

/// Work the caller should perform for a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleAction {
    /// Create the concrete transaction for this occurrence.
    Materialize {
        schedule_id: Uuid,
        ordinal: u32,
        date: NaiveDate,
    },
    /// Notify the user ahead of an upcoming occurrence.
    Remind {
        schedule_id: Uuid,
        ordinal: u32,
        occurrence: NaiveDate,
        remind_on: NaiveDate,
    },
}

impl ScheduleAction {
    pub fn schedule_id(&self) -> Uuid {
        match self {
            ScheduleAction::Materialize { schedule_id, .. }
            | ScheduleAction::Remind { schedule_id, .. } => *schedule_id,
        }
    }

    /// Date the action is keyed on: the occurrence for materializations, the
    /// reminder day for reminders.
    pub fn date(&self) -> NaiveDate {
        match self {
            ScheduleAction::Materialize { date, .. } => *date,
            ScheduleAction::Remind { remind_on, .. } => *remind_on,
        }
    }
}

/// Per-schedule summary for list views.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSnapshot {
    pub schedule_id: Uuid,
    pub name: String,
    pub label: String,
    pub next_due: Option<NaiveDate>,
    pub status: Option<ScheduledStatus>,
    pub reminder_on: Option<NaiveDate>,
    pub remaining: Option<u32>,
    pub exhausted: bool,
}

/// Collects materializations for every unfired occurrence on or before
/// `reference`, plus reminders whose window covers `reference`.
///
/// A reminder is produced once per occurrence: after it has been applied the
/// schedule records it as sent and later evaluations skip it.
///
/// At most `limit` materializations are produced per call; the remainder are
/// picked up by the next evaluation.
pub fn due_actions(
    schedules: &[ScheduledTransaction],
    reference: NaiveDate,
    limit: usize,
) -> Vec<ScheduleAction> {
    let mut actions = Vec::new();
    let mut materialized = 0usize;

    'schedules: for schedule in schedules.iter().filter(|s| s.is_active()) {
        let Some((mut ordinal, _)) = schedule.pending_occurrence() else {
            continue;
        };
        let mut upcoming = None;
        while let Some(date) = schedule.rule().nth_occurrence(ordinal) {
            if date > reference {
                upcoming = Some((ordinal, date));
                break;
            }
            if materialized >= limit {
                tracing::warn!(
                    limit,
                    "materialization cap reached; deferring remaining occurrences"
                );
                break 'schedules;
            }
            actions.push(ScheduleAction::Materialize {
                schedule_id: schedule.id,
                ordinal,
                date,
            });
            materialized += 1;
            ordinal = match ordinal.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        if let Some((ordinal, occurrence)) = upcoming {
            if schedule.is_reminded(ordinal) {
                continue;
            }
            if let Some(remind_on) = schedule.rule().reminder_date(occurrence) {
                if remind_on <= reference {
                    actions.push(ScheduleAction::Remind {
                        schedule_id: schedule.id,
                        ordinal,
                        occurrence,
                        remind_on,
                    });
                }
            }
        }
    }

    actions.sort_by_key(ScheduleAction::date);
    actions
}

/// Records every action on its schedule: materializations as fired,
/// reminders as sent.
///
/// Changes are staged and only written back once every action applied, so on
/// error `schedules` is left as it was.
pub fn apply_actions(
    schedules: &mut [ScheduledTransaction],
    actions: &[ScheduleAction],
) -> Result<usize, ScheduleError> {
    let mut staged = schedules.to_vec();
    for action in actions {
        let schedule_id = action.schedule_id();
        let schedule = staged
            .iter_mut()
            .find(|s| s.id == schedule_id)
            .ok_or(ScheduleError::UnknownSchedule(schedule_id))?;
        match action {
            ScheduleAction::Materialize { date, .. } => schedule.mark_fired(*date)?,
            ScheduleAction::Remind { occurrence, .. } => schedule.mark_reminded(*occurrence)?,
        };
    }
    schedules.clone_from_slice(&staged);
    Ok(actions.len())
}

pub fn snapshot_schedules(
    schedules: &[ScheduledTransaction],
    reference: NaiveDate,
    pending_window_days: u32,
) -> Vec<ScheduleSnapshot> {
    let mut snapshots: Vec<ScheduleSnapshot> = schedules
        .iter()
        .map(|schedule| {
            let next_due = schedule.next_due();
            ScheduleSnapshot {
                schedule_id: schedule.id,
                name: schedule.name.clone(),
                label: schedule.rule().label(),
                next_due,
                status: next_due
                    .map(|date| ScheduledStatus::classify(date, reference, pending_window_days)),
                reminder_on: next_due.and_then(|date| schedule.rule().reminder_date(date)),
                remaining: schedule.remaining(),
                exhausted: schedule.is_exhausted(),
            }
        })
        .collect();
    snapshots.sort_by_key(|snap| (snap.next_due.is_none(), snap.next_due));
    snapshots
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorSettings {
    pub pending_window_days: u32,
    pub materialize_limit: usize,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            pending_window_days: PENDING_WINDOW_DAYS,
            materialize_limit: MAX_MATERIALIZED_OCCURRENCES,
        }
    }
}

impl From<&Config> for EvaluatorSettings {
    fn from(config: &Config) -> Self {
        Self {
            pending_window_days: config.pending_window_days,
            materialize_limit: config.materialize_limit,
        }
    }
}

/// Evaluates schedules against the date reported by a [`Clock`].
#[derive(Clone)]
pub struct ScheduleEvaluator {
    clock: Arc<dyn Clock>,
    settings: EvaluatorSettings,
}

impl ScheduleEvaluator {
    pub fn new(clock: Arc<dyn Clock>, settings: EvaluatorSettings) -> Self {
        Self { clock, settings }
    }

    pub fn settings(&self) -> EvaluatorSettings {
        self.settings
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn evaluate(&self, schedules: &[ScheduledTransaction]) -> Vec<ScheduleAction> {
        let reference = self.today();
        let actions = due_actions(schedules, reference, self.settings.materialize_limit);
        tracing::info!(
            %reference,
            schedules = schedules.len(),
            actions = actions.len(),
            "evaluated schedules"
        );
        actions
    }

    /// Evaluates and immediately records the resulting actions.
    pub fn run(
        &self,
        schedules: &mut [ScheduledTransaction],
    ) -> Result<Vec<ScheduleAction>, ScheduleError> {
        let actions = self.evaluate(schedules);
        let applied = apply_actions(schedules, &actions)?;
        tracing::debug!(applied, "schedule actions recorded");
        Ok(actions)
    }

    pub fn snapshots(&self, schedules: &[ScheduledTransaction]) -> Vec<ScheduleSnapshot> {
        snapshot_schedules(schedules, self.today(), self.settings.pending_window_days)
    }
}
