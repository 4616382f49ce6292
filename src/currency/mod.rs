//! Currency metadata and locale-aware amount/date formatting.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Static description of a supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencySpec {
    pub code: &'static str,
    pub symbol: &'static str,
    pub minor_units: u8,
}

pub const CURRENCIES: &[CurrencySpec] = &[
    CurrencySpec {
        code: "USD",
        symbol: "$",
        minor_units: 2,
    },
    CurrencySpec {
        code: "EUR",
        symbol: "€",
        minor_units: 2,
    },
    CurrencySpec {
        code: "GBP",
        symbol: "£",
        minor_units: 2,
    },
    CurrencySpec {
        code: "JPY",
        symbol: "¥",
        minor_units: 0,
    },
    CurrencySpec {
        code: "CAD",
        symbol: "CA$",
        minor_units: 2,
    },
    CurrencySpec {
        code: "AUD",
        symbol: "A$",
        minor_units: 2,
    },
    CurrencySpec {
        code: "CHF",
        symbol: "CHF",
        minor_units: 2,
    },
    CurrencySpec {
        code: "INR",
        symbol: "₹",
        minor_units: 2,
    },
    CurrencySpec {
        code: "NGN",
        symbol: "₦",
        minor_units: 2,
    },
    CurrencySpec {
        code: "KWD",
        symbol: "KD",
        minor_units: 3,
    },
    CurrencySpec {
        code: "BHD",
        symbol: "BD",
        minor_units: 3,
    },
];

pub fn currency_spec(code: &str) -> Option<&'static CurrencySpec> {
    CURRENCIES
        .iter()
        .find(|spec| spec.code.eq_ignore_ascii_case(code))
}

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

/// Symbol for `code`, falling back to the code itself.
pub fn symbol_for(code: &str) -> &str {
    currency_spec(code).map_or(code, |spec| spec.symbol)
}

pub fn minor_units_for(code: &str) -> u8 {
    currency_spec(code).map_or(2, |spec| spec.minor_units)
}

/// Locale-aware formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub date_format: DateFormatStyle,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language_tag: "en-US".into(),
            decimal_separator: '.',
            grouping_separator: ',',
            date_format: DateFormatStyle::Medium,
        }
    }
}

/// Number separators by language subtag: (language, decimal, grouping).
const SEPARATORS: &[(&str, char, char)] = &[
    ("en", '.', ','),
    ("ja", '.', ','),
    ("zh", '.', ','),
    ("de", ',', '.'),
    ("es", ',', '.'),
    ("it", ',', '.'),
    ("nl", ',', '.'),
    ("pt", ',', '.'),
    ("fr", ',', ' '),
    ("sv", ',', ' '),
    ("pl", ',', ' '),
    ("ru", ',', ' '),
];

impl LocaleConfig {
    /// Locale for a BCP 47 tag such as `de-DE`. Unknown languages keep the
    /// default separators.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        let language = tag.split(['-', '_']).next().unwrap_or_default();
        let mut locale = Self::default();
        if !tag.is_empty() {
            locale.language_tag = tag.to_string();
        }
        if let Some((_, decimal, grouping)) = SEPARATORS
            .iter()
            .find(|(lang, _, _)| lang.eq_ignore_ascii_case(language))
        {
            locale.decimal_separator = *decimal;
            locale.grouping_separator = *grouping;
        }
        locale
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FormatOptions {
    pub currency_display: CurrencyDisplay,
    pub negative_style: NegativeStyle,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NegativeStyle {
    #[default]
    Sign,
    Parentheses,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CurrencyDisplay {
    #[default]
    Symbol,
    Code,
    SymbolAndCode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateFormatStyle {
    Short,
    Medium,
    Long,
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let mut body = format!("{:.*}", precision as usize, value);
    if locale.decimal_separator != '.' {
        if let Some(pos) = body.find('.') {
            body.replace_range(pos..=pos, &locale.decimal_separator.to_string());
        }
    }
    if precision > 0 {
        if let Some(pos) = body.rfind(locale.decimal_separator) {
            let int_part = group_integer(&body[..pos], locale.grouping_separator);
            return format!("{}{}", int_part, &body[pos..]);
        }
    }
    group_integer(&body, locale.grouping_separator)
}

fn group_integer(int_part: &str, separator: char) -> String {
    match int_part.strip_prefix('-') {
        Some(digits) => format!("-{}", group_digits(digits, separator)),
        None => group_digits(int_part, separator),
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.chars().count();
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && (len - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_currency_value(
    amount: f64,
    code: &CurrencyCode,
    locale: &LocaleConfig,
    options: &FormatOptions,
) -> String {
    let precision = minor_units_for(code.as_str());
    let mut body = format_number(locale, amount.abs(), precision);
    if amount < 0.0 {
        body = match options.negative_style {
            NegativeStyle::Sign => format!("-{}", body),
            NegativeStyle::Parentheses => format!("({})", body),
        };
    }
    let symbol = symbol_for(code.as_str());
    let spaced = if body.starts_with('(') {
        format!(" {}", body)
    } else {
        body.clone()
    };
    match options.currency_display {
        CurrencyDisplay::Symbol => format!("{}{}", symbol, spaced),
        CurrencyDisplay::Code => format!("{} {}", code.as_str(), body),
        CurrencyDisplay::SymbolAndCode => format!("{}{} ({})", symbol, spaced, code.as_str()),
    }
}

pub fn format_date(style: DateFormatStyle, date: NaiveDate) -> String {
    match style {
        DateFormatStyle::Short => date.format("%Y-%m-%d").to_string(),
        DateFormatStyle::Medium => format!(
            "{:02} {} {}",
            date.day(),
            month_label(date.month()),
            date.year()
        ),
        DateFormatStyle::Long => format!(
            "{}, {} {} {}",
            date.weekday(),
            date.day(),
            month_label(date.month()),
            date.year()
        ),
    }
}

fn month_label(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    month
        .checked_sub(1)
        .and_then(|idx| MONTHS.get(idx as usize))
        .copied()
        .unwrap_or("")
}
