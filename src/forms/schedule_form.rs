use crate::config::Config;
use crate::errors::{RuleViolation, ScheduleError};
use crate::schedule::{EndCondition, FrequencyType, RecurrenceRule, ScheduledTransaction};

use super::parsers::{self, EndChoice, FrequencyChoice};
use super::{FieldErrors, Validation};

const NAME_MAX_LEN: usize = 80;
const NOTES_MAX_LEN: usize = 280;

/// Raw input for a recurrence rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurrenceForm {
    pub frequency: String,
    /// Only read when `frequency` is custom.
    pub custom_unit: String,
    pub interval: String,
    pub end_type: String,
    /// Only read when `end_type` is "after occurrences".
    pub occurrences: String,
    pub start_date: String,
    pub time: String,
    pub reminder_days: String,
}

impl RecurrenceForm {
    /// Blank form pre-filled with the configured reminder lead time.
    pub fn with_defaults(config: &Config) -> Self {
        Self {
            frequency: "Once".into(),
            interval: "1".into(),
            end_type: "Never".into(),
            reminder_days: config.default_reminder_days.to_string(),
            ..Self::default()
        }
    }

    /// Form populated from an existing rule, for editing.
    pub fn from_rule(rule: &RecurrenceRule) -> Self {
        let frequency = rule.frequency();
        let (end_type, occurrences) = match rule.end() {
            EndCondition::Never => ("Never", String::new()),
            EndCondition::AfterOccurrences(limit) => ("After occurrences", limit.to_string()),
        };
        Self {
            frequency: FrequencyChoice::label(frequency).into(),
            custom_unit: match frequency {
                FrequencyType::Custom(unit) => unit.to_string(),
                _ => String::new(),
            },
            interval: rule.interval().to_string(),
            end_type: end_type.into(),
            occurrences,
            start_date: rule.start_date().format("%Y-%m-%d").to_string(),
            time: rule.time().format("%H:%M").to_string(),
            reminder_days: rule.reminder_days().to_string(),
        }
    }

    pub fn validate(&self) -> Validation<RecurrenceRule> {
        let mut errors = FieldErrors::default();
        let choice = errors.check("frequency", parsers::parse_frequency(&self.frequency));
        let interval = errors.check(
            "interval",
            parsers::parse_positive_integer(&self.interval, Some(1)),
        );
        let end_choice = errors.check("end_type", parsers::parse_end(&self.end_type));
        let start_date = errors.check("start_date", parsers::parse_required_date(&self.start_date));
        let time = errors.check("time", parsers::parse_optional_time(&self.time));
        let reminder_days = errors.check(
            "reminder_days",
            parsers::parse_reminder_days(&self.reminder_days),
        );

        let frequency = match choice {
            Some(FrequencyChoice::Custom) => {
                match errors.check("custom_unit", parsers::parse_optional_unit(&self.custom_unit)) {
                    Some(None) => {
                        errors.push("custom_unit", "Choose a unit for a custom frequency");
                        None
                    }
                    Some(unit) => FrequencyChoice::Custom.resolve(unit),
                    None => None,
                }
            }
            Some(choice) => choice.resolve(None),
            None => None,
        };

        let end = match end_choice {
            Some(EndChoice::Never) => Some(EndCondition::Never),
            Some(EndChoice::AfterOccurrences) => errors
                .check(
                    "occurrences",
                    parsers::parse_positive_integer(&self.occurrences, None),
                )
                .map(EndCondition::AfterOccurrences),
            None => None,
        };

        match (frequency, interval, end, start_date, time, reminder_days) {
            (Some(frequency), Some(interval), Some(end), Some(start), Some(time), Some(reminder))
                if errors.is_empty() =>
            {
                match RecurrenceRule::new(frequency, interval, end, start, time, reminder) {
                    Ok(rule) => Validation::Valid(rule),
                    Err(err) => {
                        errors.push(field_for(&err), err.to_string());
                        errors.into_invalid()
                    }
                }
            }
            _ => errors.into_invalid(),
        }
    }
}

fn field_for(err: &ScheduleError) -> &'static str {
    match err {
        ScheduleError::InvalidRule(RuleViolation::ZeroInterval) => "interval",
        ScheduleError::InvalidRule(RuleViolation::ZeroOccurrences) => "occurrences",
        ScheduleError::InvalidRule(RuleViolation::ReminderOutOfRange(_)) => "reminder_days",
        ScheduleError::InvalidRule(
            RuleViolation::MissingCustomUnit | RuleViolation::UnexpectedCustomUnit,
        ) => "custom_unit",
        _ => "form",
    }
}

/// Raw input for a scheduled transaction and its recurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduledTransactionForm {
    pub name: String,
    pub amount: String,
    pub account_id: String,
    /// Empty leaves the currency unset; amounts are then checked as USD.
    pub currency: String,
    pub category: String,
    pub notes: String,
    pub recurrence: RecurrenceForm,
}

impl ScheduledTransactionForm {
    pub fn with_defaults(config: &Config) -> Self {
        Self {
            currency: config.currency.clone(),
            recurrence: RecurrenceForm::with_defaults(config),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Validation<ScheduledTransaction> {
        let mut errors = FieldErrors::default();
        let name = errors.check("name", parsers::parse_name(&self.name, NAME_MAX_LEN));
        let currency = errors.check("currency", parsers::parse_optional_currency(&self.currency));
        let amount_currency = currency.clone().flatten().unwrap_or_else(|| "USD".into());
        let amount = errors.check("amount", parsers::parse_amount(&self.amount, &amount_currency));
        let account_id = errors.check("account_id", parsers::parse_account_id(&self.account_id));
        let category = errors.check(
            "category",
            parsers::parse_optional_category(&self.category),
        );
        let notes = errors.check("notes", parsers::parse_notes(&self.notes, NOTES_MAX_LEN));
        let rule = match self.recurrence.validate() {
            Validation::Valid(rule) => Some(rule),
            Validation::Invalid(rule_errors) => {
                errors.extend(rule_errors);
                None
            }
        };

        match (name, amount, account_id, currency, category, notes, rule) {
            (
                Some(name),
                Some(amount),
                Some(account_id),
                Some(currency),
                Some(category),
                Some(notes),
                Some(rule),
            ) if errors.is_empty() => {
                let mut schedule = ScheduledTransaction::new(name, amount, account_id, rule);
                schedule.currency = currency;
                schedule.category = category;
                schedule.notes = notes;
                Validation::Valid(schedule)
            }
            _ => errors.into_invalid(),
        }
    }
}
