use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar unit a schedule advances by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Parses a unit name, singular or plural, ignoring case.
    pub fn from_code(code: &str) -> Option<TimeUnit> {
        match code.trim().to_ascii_uppercase().as_str() {
            "DAY" | "DAYS" => Some(TimeUnit::Day),
            "WEEK" | "WEEKS" => Some(TimeUnit::Week),
            "MONTH" | "MONTHS" => Some(TimeUnit::Month),
            "YEAR" | "YEARS" => Some(TimeUnit::Year),
            _ => None,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeUnit::Day => "Day",
            TimeUnit::Week => "Week",
            TimeUnit::Month => "Month",
            TimeUnit::Year => "Year",
        };
        f.write_str(label)
    }
}

/// How often a scheduled transaction repeats.
///
/// `Custom` carries its unit explicitly; a custom frequency without a unit is
/// not representable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FrequencyType {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom(TimeUnit),
}

impl FrequencyType {
    /// Unit the schedule advances by, or `None` for a one-shot schedule.
    pub fn unit(&self) -> Option<TimeUnit> {
        match self {
            FrequencyType::None => None,
            FrequencyType::Daily => Some(TimeUnit::Day),
            FrequencyType::Weekly => Some(TimeUnit::Week),
            FrequencyType::Monthly => Some(TimeUnit::Month),
            FrequencyType::Yearly => Some(TimeUnit::Year),
            FrequencyType::Custom(unit) => Some(*unit),
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, FrequencyType::None)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    pub every: u32,
    pub unit: TimeUnit,
}

impl TimeInterval {
    pub fn new(every: u32, unit: TimeUnit) -> Self {
        Self { every, unit }
    }

    /// Date reached after `steps` whole intervals from `anchor`.
    ///
    /// Month and year steps are measured from the anchor, so a day clamped
    /// to a short month does not carry into later steps. Returns `None` when
    /// the result leaves the representable calendar.
    pub fn step_from(&self, anchor: NaiveDate, steps: u32) -> Option<NaiveDate> {
        let count = u64::from(self.every).checked_mul(u64::from(steps))?;
        match self.unit {
            TimeUnit::Day => anchor.checked_add_days(Days::new(count)),
            TimeUnit::Week => anchor.checked_add_days(Days::new(count.checked_mul(7)?)),
            TimeUnit::Month => {
                let months = u32::try_from(count).ok()?;
                anchor.checked_add_months(Months::new(months))
            }
            TimeUnit::Year => {
                let months = u32::try_from(count.checked_mul(12)?).ok()?;
                anchor.checked_add_months(Months::new(months))
            }
        }
    }

    pub fn next_date(&self, from: NaiveDate) -> Option<NaiveDate> {
        self.step_from(from, 1)
    }

    /// Largest step count `k` with `step_from(anchor, k) <= date`.
    ///
    /// `date` must not precede `anchor`.
    pub fn steps_not_after(&self, anchor: NaiveDate, date: NaiveDate) -> u32 {
        debug_assert!(date >= anchor);
        let every = i64::from(self.every.max(1));
        let steps = match self.unit {
            TimeUnit::Day => (date - anchor).num_days() / every,
            TimeUnit::Week => (date - anchor).num_days() / (every * 7),
            TimeUnit::Month => month_span(anchor, date) / every,
            TimeUnit::Year => month_span(anchor, date) / (every * 12),
        };
        let mut steps = u32::try_from(steps).unwrap_or(u32::MAX);
        if matches!(self.unit, TimeUnit::Month | TimeUnit::Year) && steps > 0 {
            // Same target month but an earlier day of month than the anchor's.
            match self.step_from(anchor, steps) {
                Some(candidate) if candidate <= date => {}
                _ => steps -= 1,
            }
        }
        steps
    }

    pub fn label(&self) -> String {
        match (self.every, &self.unit) {
            (1, TimeUnit::Day) => "Daily".into(),
            (1, TimeUnit::Week) => "Weekly".into(),
            (1, TimeUnit::Month) => "Monthly".into(),
            (1, TimeUnit::Year) => "Yearly".into(),
            (n, unit) => format!("Every {} {}{}", n, unit, if n > 1 { "s" } else { "" }),
        }
    }
}

fn month_span(from: NaiveDate, to: NaiveDate) -> i64 {
    let from_idx = i64::from(from.year()) * 12 + i64::from(from.month0());
    let to_idx = i64::from(to.year()) * 12 + i64::from(to.month0());
    to_idx - from_idx
}
