//! Money, percentage and date rendering for CLI and report output.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency code, stored upper-case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
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

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateFormatStyle {
    /// `2025-03-09`
    Iso,
    /// `09/03/2025`
    DayFirst,
    /// `03/09/2025`
    MonthFirst,
    /// `09 Mar 2025`
    Medium,
}

/// Separators and date style of a display locale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub date_format: DateFormatStyle,
    /// Whether the currency symbol is followed by a space (`R$ 10,00`).
    pub symbol_spacing: bool,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::en_us()
    }
}

impl LocaleConfig {
    pub fn en_us() -> Self {
        Self {
            language_tag: "en-US".into(),
            decimal_separator: '.',
            grouping_separator: ',',
            date_format: DateFormatStyle::MonthFirst,
            symbol_spacing: false,
        }
    }

    pub fn pt_br() -> Self {
        Self {
            language_tag: "pt-BR".into(),
            decimal_separator: ',',
            grouping_separator: '.',
            date_format: DateFormatStyle::DayFirst,
            symbol_spacing: true,
        }
    }

    /// Preset for a BCP 47 tag; unknown tags fall back to ISO dates with `en-US` numbers.
    pub fn for_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en-us" | "en" => Self::en_us(),
            "pt-br" | "pt" => Self::pt_br(),
            _ => Self {
                language_tag: tag.trim().to_string(),
                date_format: DateFormatStyle::Iso,
                ..Self::en_us()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NegativeStyle {
    Sign,
    Parentheses,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CurrencyDisplay {
    Symbol,
    Code,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormatOptions {
    pub currency_display: CurrencyDisplay,
    pub negative_style: NegativeStyle,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            currency_display: CurrencyDisplay::Symbol,
            negative_style: NegativeStyle::Sign,
        }
    }
}

pub fn symbol_for(code: &str) -> &str {
    match code {
        "BRL" => "R$",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        other => other,
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

/// Fixed-precision number with the locale's separators. Non-finite input renders as zero.
pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let rendered = format!("{:.*}", precision as usize, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    let mut body = group_digits(int_part, locale.grouping_separator);
    if let Some(frac) = frac_part {
        body.push(locale.decimal_separator);
        body.push_str(frac);
    }
    if value < 0.0 && body.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        body.insert(0, '-');
    }
    body
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
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
    let body = format_number(locale, amount.abs(), minor_units_for(code.as_str()));
    let prefix = match options.currency_display {
        CurrencyDisplay::Symbol => symbol_for(code.as_str()).to_string(),
        CurrencyDisplay::Code => code.as_str().to_string(),
    };
    let gap = if locale.symbol_spacing || options.currency_display == CurrencyDisplay::Code {
        " "
    } else {
        ""
    };
    let unsigned = format!("{prefix}{gap}{body}");
    if amount < 0.0 && amount.is_finite() {
        match options.negative_style {
            NegativeStyle::Sign => format!("-{unsigned}"),
            NegativeStyle::Parentheses => format!("({unsigned})"),
        }
    } else {
        unsigned
    }
}

/// One decimal place, e.g. `91.7%` or `91,7%`.
pub fn format_percent(locale: &LocaleConfig, pct: f64) -> String {
    format!("{}%", format_number(locale, pct, 1))
}

pub fn format_date(locale: &LocaleConfig, date: NaiveDate) -> String {
    match locale.date_format {
        DateFormatStyle::Iso => date.format("%Y-%m-%d").to_string(),
        DateFormatStyle::DayFirst => date.format("%d/%m/%Y").to_string(),
        DateFormatStyle::MonthFirst => date.format("%m/%d/%Y").to_string(),
        DateFormatStyle::Medium => format!(
            "{:02} {} {}",
            date.day(),
            month_label(date.month()),
            date.year()
        ),
    }
}

fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_brazilian_real() {
        let formatted = format_currency_value(
            1234.5,
            &CurrencyCode::new("brl"),
            &LocaleConfig::pt_br(),
            &FormatOptions::default(),
        );
        assert_eq!(formatted, "R$ 1.234,50");
    }

    #[test]
    fn formats_negative_dollars() {
        let locale = LocaleConfig::en_us();
        let code = CurrencyCode::default();
        assert_eq!(
            format_currency_value(-1234567.0, &code, &locale, &FormatOptions::default()),
            "-$1,234,567.00"
        );
        let parens = FormatOptions {
            negative_style: NegativeStyle::Parentheses,
            ..FormatOptions::default()
        };
        assert_eq!(format_currency_value(-5.0, &code, &locale, &parens), "($5.00)");
    }

    #[test]
    fn number_grouping_handles_short_values() {
        let locale = LocaleConfig::en_us();
        assert_eq!(format_number(&locale, 999.0, 0), "999");
        assert_eq!(format_number(&locale, 1000.0, 0), "1,000");
        assert_eq!(format_number(&locale, f64::NAN, 2), "0.00");
        assert_eq!(format_number(&locale, -0.001, 2), "0.00");
    }

    #[test]
    fn percent_and_dates_follow_locale() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(format_percent(&LocaleConfig::pt_br(), 91.666), "91,7%");
        assert_eq!(format_date(&LocaleConfig::pt_br(), date), "09/03/2025");
        assert_eq!(format_date(&LocaleConfig::en_us(), date), "03/09/2025");
        assert_eq!(format_date(&LocaleConfig::for_tag("de-DE"), date), "2025-03-09");
    }
}
