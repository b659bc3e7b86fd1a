//! Period windows for spending controls.
//!
//! Calendar arithmetic happens on local dates in the control's timezone; the
//! resulting midnights are converted back to UTC instants for filtering.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::core::errors::{ControlError, Result};
use crate::domain::control::SpendingControl;

pub const DEFAULT_RESET_DAY: u32 = 1;
/// Monday, using the Sunday = 0 numbering of the API.
pub const DEFAULT_RESET_WEEKDAY: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Weekly,
    Monthly,
    Bimonthly,
    Quarterly,
    HalfYearly,
    Annually,
}

impl PeriodType {
    /// Months per cycle, `None` for week-based periods.
    pub fn month_stride(&self) -> Option<u32> {
        match self {
            PeriodType::Weekly => None,
            PeriodType::Monthly => Some(1),
            PeriodType::Bimonthly => Some(2),
            PeriodType::Quarterly => Some(3),
            PeriodType::HalfYearly => Some(6),
            PeriodType::Annually => Some(12),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Bimonthly => "bimonthly",
            PeriodType::Quarterly => "quarterly",
            PeriodType::HalfYearly => "half_yearly",
            PeriodType::Annually => "annually",
        }
    }
}

impl FromStr for PeriodType {
    type Err = ControlError;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "weekly" => Ok(PeriodType::Weekly),
            "monthly" => Ok(PeriodType::Monthly),
            "bimonthly" => Ok(PeriodType::Bimonthly),
            "quarterly" => Ok(PeriodType::Quarterly),
            "half_yearly" | "halfyearly" => Ok(PeriodType::HalfYearly),
            "annually" | "annual" | "yearly" => Ok(PeriodType::Annually),
            _ => Err(ControlError::InvalidPeriodType(raw.to_string())),
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeriodType::Weekly => "Weekly",
            PeriodType::Monthly => "Monthly",
            PeriodType::Bimonthly => "Bimonthly",
            PeriodType::Quarterly => "Quarterly",
            PeriodType::HalfYearly => "Half-yearly",
            PeriodType::Annually => "Annually",
        };
        f.write_str(label)
    }
}

/// Validated cycle anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PeriodAnchor {
    DayOfMonth(u32),
    /// 0 = Sunday .. 6 = Saturday.
    Weekday(u32),
}

/// Local calendar dates of one cycle, `[start, next_start)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarCycle {
    pub start: NaiveDate,
    pub next_start: NaiveDate,
}

impl CalendarCycle {
    pub fn days(&self) -> i64 {
        (self.next_start - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.next_start
    }

    /// Last calendar day of the cycle.
    pub fn last_day(&self) -> NaiveDate {
        self.next_start.pred_opt().unwrap_or(self.start)
    }
}

/// Resolved boundaries of one cycle. `end` is inclusive and sits one
/// microsecond before `next_reset_at`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub next_reset_at: DateTime<Utc>,
    pub cycle: CalendarCycle,
}

impl PeriodWindow {
    pub fn from_cycle<Z: TimeZone>(cycle: CalendarCycle, tz: &Z) -> Self {
        let start = local_midnight_utc(tz, cycle.start);
        let next_reset_at = local_midnight_utc(tz, cycle.next_start);
        Self {
            start,
            end: next_reset_at - Duration::microseconds(1),
            next_reset_at,
            cycle,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    pub fn days(&self) -> i64 {
        self.cycle.days()
    }
}

/// Computes cycle boundaries for one period configuration.
#[derive(Debug, Clone)]
pub struct PeriodResolver {
    period_type: PeriodType,
    anchor: PeriodAnchor,
    tz: Tz,
}

impl PeriodResolver {
    pub fn new(
        period_type: PeriodType,
        reset_day: Option<u32>,
        reset_weekday: Option<u32>,
        tz: Tz,
    ) -> Result<Self> {
        let anchor = match period_type {
            PeriodType::Weekly => {
                let weekday = reset_weekday.unwrap_or(DEFAULT_RESET_WEEKDAY);
                if weekday > 6 {
                    return Err(ControlError::InvalidResetWeekday(weekday));
                }
                PeriodAnchor::Weekday(weekday)
            }
            _ => {
                let day = reset_day.unwrap_or(DEFAULT_RESET_DAY);
                if !(1..=31).contains(&day) {
                    return Err(ControlError::InvalidResetDay(day));
                }
                PeriodAnchor::DayOfMonth(day)
            }
        };
        Ok(Self {
            period_type,
            anchor,
            tz,
        })
    }

    /// Parses the control's raw period type, anchor and timezone.
    pub fn for_control(control: &SpendingControl) -> Result<Self> {
        let period_type: PeriodType = control.period_type.parse()?;
        let tz = parse_timezone(control.timezone.as_deref())?;
        Self::new(period_type, control.reset_day, control.reset_weekday, tz)
    }

    pub fn period_type(&self) -> PeriodType {
        self.period_type
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    pub fn cycle_containing(&self, date: NaiveDate) -> Result<CalendarCycle> {
        match (self.anchor, self.period_type.month_stride()) {
            (PeriodAnchor::Weekday(weekday), _) => weekly_cycle(date, weekday),
            (PeriodAnchor::DayOfMonth(day), Some(stride)) => {
                monthly_cycle(date, day, stride as i32)
            }
            (PeriodAnchor::DayOfMonth(day), None) => monthly_cycle(date, day, 1),
        }
    }

    pub fn window_containing(&self, reference: DateTime<Utc>) -> Result<PeriodWindow> {
        let cycle = self.cycle_containing(self.local_date(reference))?;
        Ok(PeriodWindow::from_cycle(cycle, &self.tz))
    }

    /// Window immediately before `window`.
    pub fn previous(&self, window: &PeriodWindow) -> Result<PeriodWindow> {
        let day_before = window
            .cycle
            .start
            .pred_opt()
            .ok_or_else(|| out_of_range(window.cycle.start))?;
        let cycle = self.cycle_containing(day_before)?;
        Ok(PeriodWindow::from_cycle(cycle, &self.tz))
    }
}

pub fn parse_timezone(raw: Option<&str>) -> Result<Tz> {
    match raw.map(str::trim).filter(|name| !name.is_empty()) {
        None => Ok(Tz::UTC),
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| ControlError::InvalidTimezone(name.to_string())),
    }
}

/// Midnight of `date` in `tz`, as UTC. When midnight falls in a DST gap the
/// first valid hour of that day is used.
pub fn local_midnight_utc<Z: TimeZone>(tz: &Z, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=3)
        .find_map(|hours| {
            tz.from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

fn weekly_cycle(date: NaiveDate, weekday: u32) -> Result<CalendarCycle> {
    let offset = (date.weekday().num_days_from_sunday() + 7 - weekday) % 7;
    let start = date
        .checked_sub_days(Days::new(offset as u64))
        .ok_or_else(|| out_of_range(date))?;
    let next_start = start
        .checked_add_days(Days::new(7))
        .ok_or_else(|| out_of_range(date))?;
    Ok(CalendarCycle { start, next_start })
}

fn monthly_cycle(date: NaiveDate, reset_day: u32, stride: i32) -> Result<CalendarCycle> {
    let reference_idx = month_index(date);
    // Blocks are aligned to January; year * 12 is a multiple of every stride.
    let mut block_idx = reference_idx - reference_idx.rem_euclid(stride);
    let mut start = anchored_date(block_idx, reset_day).ok_or_else(|| out_of_range(date))?;
    if start > date {
        block_idx -= stride;
        start = anchored_date(block_idx, reset_day).ok_or_else(|| out_of_range(date))?;
    }
    let next_start =
        anchored_date(block_idx + stride, reset_day).ok_or_else(|| out_of_range(date))?;
    Ok(CalendarCycle { start, next_start })
}

pub(crate) fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// `day` of the month at `idx`, clamped to that month's length.
pub(crate) fn anchored_date(idx: i32, day: u32) -> Option<NaiveDate> {
    let year = idx.div_euclid(12);
    let month = idx.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

fn out_of_range(date: NaiveDate) -> ControlError {
    ControlError::InvalidInput(format!("date {} is outside the supported calendar range", date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolver(period_type: PeriodType, reset_day: u32) -> PeriodResolver {
        PeriodResolver::new(period_type, Some(reset_day), None, Tz::UTC).unwrap()
    }

    #[test]
    fn monthly_cycle_starts_on_reset_day() {
        let cycle = resolver(PeriodType::Monthly, 10)
            .cycle_containing(date(2025, 3, 15))
            .unwrap();
        assert_eq!(cycle.start, date(2025, 3, 10));
        assert_eq!(cycle.next_start, date(2025, 4, 10));

        let before_reset = resolver(PeriodType::Monthly, 10)
            .cycle_containing(date(2025, 3, 9))
            .unwrap();
        assert_eq!(before_reset.start, date(2025, 2, 10));
        assert_eq!(before_reset.next_start, date(2025, 3, 10));
    }

    #[test]
    fn reset_day_clamps_to_short_months() {
        let resolver = resolver(PeriodType::Monthly, 31);
        let feb = resolver.cycle_containing(date(2025, 2, 28)).unwrap();
        assert_eq!(feb.start, date(2025, 2, 28));
        assert_eq!(feb.next_start, date(2025, 3, 31));

        let mid_feb = resolver.cycle_containing(date(2025, 2, 15)).unwrap();
        assert_eq!(mid_feb.start, date(2025, 1, 31));
        assert_eq!(mid_feb.next_start, date(2025, 2, 28));

        let leap = resolver.cycle_containing(date(2024, 3, 10)).unwrap();
        assert_eq!(leap.start, date(2024, 2, 29));
    }

    #[test]
    fn multi_month_strides_align_to_january() {
        let quarter = resolver(PeriodType::Quarterly, 1)
            .cycle_containing(date(2025, 5, 20))
            .unwrap();
        assert_eq!(quarter.start, date(2025, 4, 1));
        assert_eq!(quarter.next_start, date(2025, 7, 1));

        let bimonthly = resolver(PeriodType::Bimonthly, 5)
            .cycle_containing(date(2025, 1, 3))
            .unwrap();
        assert_eq!(bimonthly.start, date(2024, 11, 5));
        assert_eq!(bimonthly.next_start, date(2025, 1, 5));

        let half = resolver(PeriodType::HalfYearly, 1)
            .cycle_containing(date(2025, 12, 31))
            .unwrap();
        assert_eq!(half.start, date(2025, 7, 1));
        assert_eq!(half.next_start, date(2026, 1, 1));

        let annual = resolver(PeriodType::Annually, 15)
            .cycle_containing(date(2025, 1, 14))
            .unwrap();
        assert_eq!(annual.start, date(2024, 1, 15));
        assert_eq!(annual.next_start, date(2025, 1, 15));
    }

    #[test]
    fn weekly_cycle_uses_reset_weekday() {
        // 2025-03-12 is a Wednesday.
        let monday = PeriodResolver::new(PeriodType::Weekly, None, None, Tz::UTC).unwrap();
        let cycle = monday.cycle_containing(date(2025, 3, 12)).unwrap();
        assert_eq!(cycle.start, date(2025, 3, 10));
        assert_eq!(cycle.next_start, date(2025, 3, 17));

        let wednesday = PeriodResolver::new(PeriodType::Weekly, None, Some(3), Tz::UTC).unwrap();
        let same_day = wednesday.cycle_containing(date(2025, 3, 12)).unwrap();
        assert_eq!(same_day.start, date(2025, 3, 12));
        assert_eq!(same_day.days(), 7);
    }

    #[test]
    fn rejects_unknown_period_type_and_bad_anchors() {
        assert!(matches!(
            "fortnightly".parse::<PeriodType>(),
            Err(ControlError::InvalidPeriodType(raw)) if raw == "fortnightly"
        ));
        assert_eq!("HALF-YEARLY".parse::<PeriodType>().unwrap(), PeriodType::HalfYearly);
        assert!(matches!(
            PeriodResolver::new(PeriodType::Monthly, Some(0), None, Tz::UTC),
            Err(ControlError::InvalidResetDay(0))
        ));
        assert!(matches!(
            PeriodResolver::new(PeriodType::Weekly, Some(40), Some(7), Tz::UTC),
            Err(ControlError::InvalidResetWeekday(7))
        ));
        assert!(matches!(
            parse_timezone(Some("Mars/Olympus")),
            Err(ControlError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn window_end_is_one_microsecond_before_reset() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        let window = resolver(PeriodType::Monthly, 1)
            .window_containing(reference)
            .unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(window.next_reset_at, Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap());
        assert_eq!(window.next_reset_at - window.end, Duration::microseconds(1));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.next_reset_at));
    }

    #[test]
    fn local_timezone_shifts_utc_boundaries() {
        let sao_paulo: Tz = "America/Sao_Paulo".parse().unwrap();
        let resolver = PeriodResolver::new(PeriodType::Monthly, Some(1), None, sao_paulo).unwrap();
        // 01:00 UTC on April 1st is still March 31st in Sao Paulo (UTC-3).
        let reference = Utc.with_ymd_and_hms(2025, 4, 1, 1, 0, 0).unwrap();
        let window = resolver.window_containing(reference).unwrap();
        assert_eq!(window.cycle.start, date(2025, 3, 1));
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 1, 3, 0, 0).unwrap());
        assert_eq!(window.next_reset_at, Utc.with_ymd_and_hms(2025, 4, 1, 3, 0, 0).unwrap());
    }

    #[test]
    fn previous_window_steps_back_one_cycle() {
        let resolver = resolver(PeriodType::Monthly, 31);
        let reference = Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap();
        let current = resolver.window_containing(reference).unwrap();
        assert_eq!(current.cycle.start, date(2025, 2, 28));
        let previous = resolver.previous(&current).unwrap();
        assert_eq!(previous.cycle.start, date(2025, 1, 31));
        assert_eq!(previous.next_reset_at, current.start);
    }
}
