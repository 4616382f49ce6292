use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::frequency::{FrequencyType, TimeInterval, TimeUnit};
use crate::errors::{RuleViolation, ScheduleError};

/// Longest reminder lead time a rule accepts, in days.
pub const MAX_REMINDER_DAYS: u32 = 14;
/// Upper bound on dates returned by a single window query.
pub const MAX_WINDOW_OCCURRENCES: usize = 1024;

/// Determines whether a rule terminates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EndCondition {
    #[default]
    Never,
    AfterOccurrences(u32),
}

/// How a scheduled transaction repeats.
///
/// Fields are private: every instance has passed validation, whether it was
/// built, updated, or deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleRecord", into = "RuleRecord")]
pub struct RecurrenceRule {
    frequency: FrequencyType,
    interval: u32,
    end: EndCondition,
    start_date: NaiveDate,
    time: NaiveTime,
    reminder_days: u32,
}

impl RecurrenceRule {
    pub fn new(
        frequency: FrequencyType,
        interval: u32,
        end: EndCondition,
        start_date: NaiveDate,
        time: NaiveTime,
        reminder_days: u32,
    ) -> Result<Self, ScheduleError> {
        validate(interval, end, reminder_days)?;
        Ok(Self {
            frequency,
            interval,
            end,
            start_date,
            time,
            reminder_days,
        })
    }

    /// Starts a builder for a one-shot rule on `start_date` at midnight.
    pub fn builder(start_date: NaiveDate) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new(start_date)
    }

    /// A non-repeating rule firing once on `start_date`.
    pub fn once(start_date: NaiveDate) -> Self {
        Self {
            frequency: FrequencyType::None,
            interval: 1,
            end: EndCondition::Never,
            start_date,
            time: NaiveTime::default(),
            reminder_days: 0,
        }
    }

    pub fn frequency(&self) -> FrequencyType {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn end(&self) -> EndCondition {
        self.end
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn reminder_days(&self) -> u32 {
        self.reminder_days
    }

    /// Step between occurrences, or `None` for a one-shot rule.
    pub fn cadence(&self) -> Option<TimeInterval> {
        self.frequency
            .unit()
            .map(|unit| TimeInterval::new(self.interval, unit))
    }

    /// Total number of occurrences, `None` when the rule never ends.
    pub fn total_occurrences(&self) -> Option<u32> {
        match (self.frequency, self.end) {
            (FrequencyType::None, _) => Some(1),
            (_, EndCondition::AfterOccurrences(limit)) => Some(limit),
            (_, EndCondition::Never) => None,
        }
    }

    /// Date of the occurrence with the given 1-based ordinal.
    pub fn nth_occurrence(&self, ordinal: u32) -> Option<NaiveDate> {
        if ordinal == 0 {
            return None;
        }
        if let Some(limit) = self.total_occurrences() {
            if ordinal > limit {
                return None;
            }
        }
        match self.cadence() {
            None => Some(self.start_date),
            Some(cadence) => cadence.step_from(self.start_date, ordinal - 1),
        }
    }

    /// Earliest occurrence strictly after `after`, or `None` once the
    /// schedule has no further dates.
    pub fn next_occurrence(&self, after: NaiveDate) -> Option<NaiveDate> {
        self.nth_occurrence(self.ordinal_after(after)?)
    }

    /// 1-based ordinal of `date` in the sequence starting at the start date.
    ///
    /// The ordinal is not capped by the end condition; compare it against
    /// [`total_occurrences`](Self::total_occurrences) to test the bound.
    pub fn occurrence_index_of(&self, date: NaiveDate) -> Result<u32, ScheduleError> {
        let invalid = || ScheduleError::InvalidDate { date };
        if date < self.start_date {
            return Err(invalid());
        }
        match self.cadence() {
            None if date == self.start_date => Ok(1),
            None => Err(invalid()),
            Some(cadence) => {
                let steps = cadence.steps_not_after(self.start_date, date);
                if cadence.step_from(self.start_date, steps) == Some(date) {
                    steps.checked_add(1).ok_or_else(invalid)
                } else {
                    Err(invalid())
                }
            }
        }
    }

    /// Whether `fired` firings use up every occurrence the rule allows.
    pub fn is_exhausted(&self, fired: u32) -> bool {
        self.total_occurrences()
            .is_some_and(|limit| fired >= limit)
    }

    /// Firings left after `fired`, `None` when the rule never ends.
    pub fn remaining_occurrences(&self, fired: u32) -> Option<u32> {
        self.total_occurrences()
            .map(|limit| limit.saturating_sub(fired))
    }

    /// All occurrences from the start date.
    pub fn occurrences(&self) -> Occurrences<'_> {
        Occurrences::new(self, Some(1))
    }

    /// Occurrences strictly after `after`.
    pub fn occurrences_after(&self, after: NaiveDate) -> Occurrences<'_> {
        Occurrences::new(self, self.ordinal_after(after))
    }

    /// Occurrences within `from..=to`.
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        if to < from {
            return Vec::new();
        }
        let first = match from.pred_opt() {
            Some(before) => self.ordinal_after(before),
            None => Some(1),
        };
        Occurrences::new(self, first)
            .take_while(|date| *date <= to)
            .take(MAX_WINDOW_OCCURRENCES)
            .collect()
    }

    /// Next firing strictly after `after`, combining dates with the rule's time.
    pub fn next_occurrence_at(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let day = after.date();
        if let Ok(ordinal) = self.occurrence_index_of(day) {
            if self.nth_occurrence(ordinal).is_some() {
                let candidate = day.and_time(self.time);
                if candidate > after {
                    return Some(candidate);
                }
            }
        }
        self.next_occurrence(day)
            .map(|date| date.and_time(self.time))
    }

    /// Day a reminder should be raised for `occurrence`, if reminders are on.
    pub fn reminder_date(&self, occurrence: NaiveDate) -> Option<NaiveDate> {
        if self.reminder_days == 0 {
            return None;
        }
        occurrence.checked_sub_days(Days::new(u64::from(self.reminder_days)))
    }

    pub fn label(&self) -> String {
        match self.cadence() {
            None => "Once".into(),
            Some(cadence) => cadence.label(),
        }
    }

    /// Applies `update` atomically. The rule is left untouched on error.
    pub fn apply_update(&mut self, update: RuleUpdate) -> Result<RuleChange, ScheduleError> {
        let next = RecurrenceRule::new(
            update.frequency.unwrap_or(self.frequency),
            update.interval.unwrap_or(self.interval),
            update.end.unwrap_or(self.end),
            update.start_date.unwrap_or(self.start_date),
            update.time.unwrap_or(self.time),
            update.reminder_days.unwrap_or(self.reminder_days),
        )?;
        let change = if next == *self {
            RuleChange::Unchanged
        } else if next.frequency != self.frequency
            || next.interval != self.interval
            || next.start_date != self.start_date
        {
            RuleChange::Cadence
        } else {
            RuleChange::Details
        };
        tracing::debug!(
            label = %next.label(),
            start = %next.start_date,
            ?change,
            "recurrence rule updated"
        );
        *self = next;
        Ok(change)
    }

    fn ordinal_after(&self, after: NaiveDate) -> Option<u32> {
        if after < self.start_date {
            return Some(1);
        }
        let cadence = self.cadence()?;
        cadence
            .steps_not_after(self.start_date, after)
            .checked_add(2)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.label(), self.start_date)?;
        match self.total_occurrences() {
            Some(1) if !self.frequency.is_recurring() => Ok(()),
            Some(1) => f.write_str(", once"),
            Some(limit) => write!(f, ", {} times", limit),
            None => Ok(()),
        }
    }
}

fn validate(interval: u32, end: EndCondition, reminder_days: u32) -> Result<(), RuleViolation> {
    if interval == 0 {
        return Err(RuleViolation::ZeroInterval);
    }
    if end == EndCondition::AfterOccurrences(0) {
        return Err(RuleViolation::ZeroOccurrences);
    }
    if reminder_days > MAX_REMINDER_DAYS {
        return Err(RuleViolation::ReminderOutOfRange(reminder_days));
    }
    Ok(())
}

/// Fluent construction for [`RecurrenceRule`]; validation runs in `build`.
#[derive(Debug, Clone)]
pub struct RecurrenceRuleBuilder {
    frequency: FrequencyType,
    interval: u32,
    end: EndCondition,
    start_date: NaiveDate,
    time: NaiveTime,
    reminder_days: u32,
}

impl RecurrenceRuleBuilder {
    fn new(start_date: NaiveDate) -> Self {
        Self {
            frequency: FrequencyType::None,
            interval: 1,
            end: EndCondition::Never,
            start_date,
            time: NaiveTime::default(),
            reminder_days: 0,
        }
    }

    pub fn frequency(mut self, frequency: FrequencyType) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn ends(mut self, end: EndCondition) -> Self {
        self.end = end;
        self
    }

    pub fn after_occurrences(self, count: u32) -> Self {
        self.ends(EndCondition::AfterOccurrences(count))
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = time;
        self
    }

    pub fn remind_days_before(mut self, days: u32) -> Self {
        self.reminder_days = days;
        self
    }

    pub fn build(self) -> Result<RecurrenceRule, ScheduleError> {
        RecurrenceRule::new(
            self.frequency,
            self.interval,
            self.end,
            self.start_date,
            self.time,
            self.reminder_days,
        )
    }
}

/// Field changes for [`RecurrenceRule::apply_update`]; `None` keeps the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleUpdate {
    pub frequency: Option<FrequencyType>,
    pub interval: Option<u32>,
    pub end: Option<EndCondition>,
    pub start_date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub reminder_days: Option<u32>,
}

/// What an update changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleChange {
    Unchanged,
    /// End condition, time, or reminder changed; existing dates still hold.
    Details,
    /// Frequency, interval, or start date changed; the date sequence moved.
    Cadence,
}

/// Iterator over a rule's occurrence dates in increasing order.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    next_ordinal: Option<u32>,
}

impl<'a> Occurrences<'a> {
    fn new(rule: &'a RecurrenceRule, first_ordinal: Option<u32>) -> Self {
        Self {
            rule,
            next_ordinal: first_ordinal,
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let ordinal = self.next_ordinal?;
        match self.rule.nth_occurrence(ordinal) {
            Some(date) => {
                self.next_ordinal = ordinal.checked_add(1);
                Some(date)
            }
            None => {
                self.next_ordinal = None;
                None
            }
        }
    }
}

impl std::iter::FusedIterator for Occurrences<'_> {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum FrequencyCode {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum EndType {
    #[default]
    Never,
    AfterOccurrences,
}

/// JSON shape exchanged with the application API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleRecord {
    frequency_type: FrequencyCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_unit: Option<TimeUnit>,
    #[serde(default = "RuleRecord::default_interval")]
    frequency_interval: u32,
    #[serde(default)]
    end_type: EndType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    occurrence: Option<u32>,
    start_date: NaiveDate,
    #[serde(default)]
    time: NaiveTime,
    #[serde(default, rename = "remainderDays", alias = "reminderDays")]
    reminder_days: u32,
}

impl RuleRecord {
    fn default_interval() -> u32 {
        1
    }
}

impl TryFrom<RuleRecord> for RecurrenceRule {
    type Error = ScheduleError;

    fn try_from(record: RuleRecord) -> Result<Self, Self::Error> {
        let frequency = match (record.frequency_type, record.custom_unit) {
            (FrequencyCode::Custom, Some(unit)) => FrequencyType::Custom(unit),
            (FrequencyCode::Custom, None) => return Err(RuleViolation::MissingCustomUnit.into()),
            (_, Some(_)) => return Err(RuleViolation::UnexpectedCustomUnit.into()),
            (FrequencyCode::None, None) => FrequencyType::None,
            (FrequencyCode::Daily, None) => FrequencyType::Daily,
            (FrequencyCode::Weekly, None) => FrequencyType::Weekly,
            (FrequencyCode::Monthly, None) => FrequencyType::Monthly,
            (FrequencyCode::Yearly, None) => FrequencyType::Yearly,
        };
        let end = match record.end_type {
            EndType::Never => EndCondition::Never,
            EndType::AfterOccurrences => {
                EndCondition::AfterOccurrences(record.occurrence.unwrap_or(0))
            }
        };
        RecurrenceRule::new(
            frequency,
            record.frequency_interval,
            end,
            record.start_date,
            record.time,
            record.reminder_days,
        )
    }
}

impl From<RecurrenceRule> for RuleRecord {
    fn from(rule: RecurrenceRule) -> Self {
        let (frequency_type, custom_unit) = match rule.frequency {
            FrequencyType::None => (FrequencyCode::None, None),
            FrequencyType::Daily => (FrequencyCode::Daily, None),
            FrequencyType::Weekly => (FrequencyCode::Weekly, None),
            FrequencyType::Monthly => (FrequencyCode::Monthly, None),
            FrequencyType::Yearly => (FrequencyCode::Yearly, None),
            FrequencyType::Custom(unit) => (FrequencyCode::Custom, Some(unit)),
        };
        let (end_type, occurrence) = match rule.end {
            EndCondition::Never => (EndType::Never, None),
            EndCondition::AfterOccurrences(limit) => (EndType::AfterOccurrences, Some(limit)),
        };
        Self {
            frequency_type,
            custom_unit,
            frequency_interval: rule.interval,
            end_type,
            occurrence,
            start_date: rule.start_date,
            time: rule.time,
            reminder_days: rule.reminder_days,
        }
    }
}
