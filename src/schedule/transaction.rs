use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rule::{RecurrenceRule, RuleChange, RuleUpdate};
use crate::errors::ScheduleError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ScheduleStatus {
    #[default]
    Active,
    Paused,
}

/// A transaction that materializes on each occurrence of its rule.
///
/// `fired` counts occurrences already materialized since the rule's start
/// date; it is runtime state, separate from the rule definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTransaction {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub account_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    rule: RecurrenceRule,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default)]
    fired: u32,
    #[serde(default)]
    last_fired: Option<NaiveDate>,
    /// Ordinal of the occurrence whose reminder was last sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_reminded: Option<u32>,
}

impl ScheduledTransaction {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        account_id: Uuid,
        rule: RecurrenceRule,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            currency: None,
            account_id,
            category: None,
            notes: None,
            rule,
            status: ScheduleStatus::Active,
            fired: 0,
            last_fired: None,
            last_reminded: None,
        }
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    pub fn fired(&self) -> u32 {
        self.fired
    }

    pub fn last_fired(&self) -> Option<NaiveDate> {
        self.last_fired
    }

    pub fn last_reminded(&self) -> Option<u32> {
        self.last_reminded
    }

    /// Whether the reminder for occurrence `ordinal` has already been sent.
    pub fn is_reminded(&self, ordinal: u32) -> bool {
        self.last_reminded.is_some_and(|sent| sent >= ordinal)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, ScheduleStatus::Active)
    }

    pub fn is_exhausted(&self) -> bool {
        self.rule.is_exhausted(self.fired)
    }

    /// Firings left, `None` when the rule never ends.
    pub fn remaining(&self) -> Option<u32> {
        self.rule.remaining_occurrences(self.fired)
    }

    /// Ordinal and date of the next unfired occurrence, ignoring pause state.
    pub fn pending_occurrence(&self) -> Option<(u32, NaiveDate)> {
        let ordinal = self.fired.checked_add(1)?;
        self.rule.nth_occurrence(ordinal).map(|date| (ordinal, date))
    }

    /// Next occurrence due to materialize, `None` when paused or exhausted.
    pub fn next_due(&self) -> Option<NaiveDate> {
        if !self.is_active() {
            return None;
        }
        self.pending_occurrence().map(|(_, date)| date)
    }

    /// Records that the occurrence on `date` materialized.
    ///
    /// Only the next unfired occurrence is accepted.
    pub fn mark_fired(&mut self, date: NaiveDate) -> Result<u32, ScheduleError> {
        if !self.is_active() {
            return Err(ScheduleError::Paused(self.id));
        }
        if self.is_exhausted() {
            return Err(ScheduleError::Exhausted(self.id));
        }
        let ordinal = self.rule.occurrence_index_of(date)?;
        let expected = self.fired.saturating_add(1);
        if ordinal != expected {
            return Err(ScheduleError::OutOfSequence {
                date,
                expected,
                actual: ordinal,
            });
        }
        self.fired = ordinal;
        self.last_fired = Some(date);
        tracing::debug!(schedule = %self.id, ordinal, %date, "occurrence fired");
        Ok(ordinal)
    }

    /// Records that the reminder for the occurrence on `occurrence` was sent.
    pub fn mark_reminded(&mut self, occurrence: NaiveDate) -> Result<u32, ScheduleError> {
        if !self.is_active() {
            return Err(ScheduleError::Paused(self.id));
        }
        let ordinal = self.rule.occurrence_index_of(occurrence)?;
        if self.rule.nth_occurrence(ordinal).is_none() {
            return Err(ScheduleError::Exhausted(self.id));
        }
        self.last_reminded = Some(ordinal);
        tracing::debug!(schedule = %self.id, ordinal, %occurrence, "reminder sent");
        Ok(ordinal)
    }

    /// Applies a rule update. A cadence change restarts occurrence counting
    /// from the rule's start date.
    pub fn update_rule(&mut self, update: RuleUpdate) -> Result<RuleChange, ScheduleError> {
        let change = self.rule.apply_update(update)?;
        if change == RuleChange::Cadence {
            self.fired = 0;
            self.last_fired = None;
            self.last_reminded = None;
            tracing::info!(schedule = %self.id, "cadence changed; occurrence count reset");
        }
        Ok(change)
    }

    pub fn pause(&mut self) {
        self.status = ScheduleStatus::Paused;
    }

    pub fn resume(&mut self) {
        self.status = ScheduleStatus::Active;
    }
}
