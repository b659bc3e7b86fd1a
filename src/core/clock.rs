use chrono::{DateTime, Utc};

/// Source of "now" for callers that do not pass an explicit reference instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Real-time clock backed by the system UTC time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_reports_its_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 14, 23, 59, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now(), instant);
    }
}
