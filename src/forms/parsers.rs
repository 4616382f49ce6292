use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::catalog;
use crate::currency::{currency_spec, minor_units_for};
use crate::schedule::{FrequencyType, TimeUnit, MAX_REMINDER_DAYS};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Frequency as picked in a form, before the custom unit is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FrequencyChoice {
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl FrequencyChoice {
    pub(super) fn label(frequency: FrequencyType) -> &'static str {
        match frequency {
            FrequencyType::None => "Once",
            FrequencyType::Daily => "Daily",
            FrequencyType::Weekly => "Weekly",
            FrequencyType::Monthly => "Monthly",
            FrequencyType::Yearly => "Yearly",
            FrequencyType::Custom(_) => "Custom",
        }
    }

    pub(super) fn resolve(self, unit: Option<TimeUnit>) -> Option<FrequencyType> {
        Some(match self {
            FrequencyChoice::Once => FrequencyType::None,
            FrequencyChoice::Daily => FrequencyType::Daily,
            FrequencyChoice::Weekly => FrequencyType::Weekly,
            FrequencyChoice::Monthly => FrequencyType::Monthly,
            FrequencyChoice::Yearly => FrequencyType::Yearly,
            FrequencyChoice::Custom => FrequencyType::Custom(unit?),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EndChoice {
    Never,
    AfterOccurrences,
}

fn normalize_choice(input: &str) -> String {
    input
        .trim()
        .to_ascii_lowercase()
        .replace(['_', '-'], " ")
}

pub(super) fn parse_frequency(input: &str) -> Result<FrequencyChoice, String> {
    match normalize_choice(input).as_str() {
        "" => Err("Frequency is required".into()),
        "once" | "none" => Ok(FrequencyChoice::Once),
        "daily" => Ok(FrequencyChoice::Daily),
        "weekly" => Ok(FrequencyChoice::Weekly),
        "monthly" => Ok(FrequencyChoice::Monthly),
        "yearly" => Ok(FrequencyChoice::Yearly),
        "custom" => Ok(FrequencyChoice::Custom),
        _ => Err(
            "Select a valid frequency (options: Once, Daily, Weekly, Monthly, Yearly, Custom)"
                .into(),
        ),
    }
}

pub(super) fn parse_optional_unit(input: &str) -> Result<Option<TimeUnit>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    TimeUnit::from_code(trimmed)
        .map(Some)
        .ok_or_else(|| "Select a valid unit (options: Day, Week, Month, Year)".into())
}

pub(super) fn parse_end(input: &str) -> Result<EndChoice, String> {
    match normalize_choice(input).as_str() {
        "" | "never" => Ok(EndChoice::Never),
        "after" | "after occurrences" => Ok(EndChoice::AfterOccurrences),
        _ => Err("Select a valid end condition (options: Never, After occurrences)".into()),
    }
}

pub(super) fn parse_positive_integer(input: &str, default: Option<u32>) -> Result<u32, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return default.ok_or_else(|| "Value is required".to_string());
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| "Enter a whole number (1 or greater)".to_string())
        .and_then(|value| {
            if value == 0 {
                Err("Value must be at least 1".into())
            } else {
                Ok(value)
            }
        })
}

pub(super) fn parse_reminder_days(input: &str) -> Result<u32, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let out_of_range = || format!("Reminder must be between 0 and {} days", MAX_REMINDER_DAYS);
    let days = trimmed.parse::<u32>().map_err(|_| out_of_range())?;
    if days > MAX_REMINDER_DAYS {
        Err(out_of_range())
    } else {
        Ok(days)
    }
}

pub(super) fn parse_required_date(input: &str) -> Result<NaiveDate, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Date is required (use YYYY-MM-DD)".into());
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| "Use YYYY-MM-DD format".into())
}

pub(super) fn parse_optional_time(input: &str) -> Result<NaiveTime, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(NaiveTime::default());
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| "Use 24-hour HH:MM format".into())
}

pub(super) fn parse_name(input: &str, max_len: usize) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Name is required".into());
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(format!("Name cannot exceed {} characters (got {})", max_len, len));
    }
    Ok(trimmed.to_string())
}

pub(super) fn parse_optional_currency(input: &str) -> Result<Option<String>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    currency_spec(trimmed)
        .map(|spec| Some(spec.code.to_string()))
        .ok_or_else(|| format!("Unsupported currency `{}`", trimmed))
}

/// Parses a positive amount, allowing no more decimals than `currency` has
/// minor units.
pub(super) fn parse_amount(input: &str, currency: &str) -> Result<f64, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Amount is required".into());
    }
    let value = trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| "Enter a numeric amount".to_string())?;
    if value <= 0.0 {
        return Err("Amount must be greater than zero".into());
    }
    let decimals = trimmed.split_once('.').map_or(0, |(_, frac)| frac.len());
    let allowed = usize::from(minor_units_for(currency));
    if decimals > allowed {
        return Err(format!(
            "{} amounts allow at most {} decimal places",
            currency.to_ascii_uppercase(),
            allowed
        ));
    }
    Ok(value)
}

pub(super) fn parse_account_id(input: &str) -> Result<Uuid, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Account is required".into());
    }
    Uuid::parse_str(trimmed).map_err(|_| "Select a valid account".into())
}

pub(super) fn parse_optional_category(input: &str) -> Result<Option<String>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if catalog::is_known_category(trimmed) {
        Ok(Some(trimmed.to_ascii_lowercase()))
    } else {
        Err(format!("Unknown category `{}`", trimmed))
    }
}

pub(super) fn parse_notes(input: &str, max_len: usize) -> Result<Option<String>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let len = trimmed.chars().count();
    if len > max_len {
        Err(format!(
            "Notes cannot exceed {} characters (got {})",
            max_len, len
        ))
    } else {
        Ok(Some(trimmed.to_string()))
    }
}
