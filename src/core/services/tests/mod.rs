mod card_service_tests;
mod spend_service_tests;

use chrono::{DateTime, TimeZone, Utc};

pub(super) fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}
