//! Minimal ISO 8601 parsing shared by the schema model and the codec.
//!
//! Accepts `YYYY-MM-DD` (midnight is assumed) and `YYYY-MM-DDTHH:MM:SS`.

use time::macros::format_description;
use time::{PrimitiveDateTime, Time};

pub(crate) fn parse(value: &str) -> Option<PrimitiveDateTime> {
    if let Ok(date) = time::Date::parse(value, format_description!("[year]-[month]-[day]")) {
        return Some(PrimitiveDateTime::new(date, Time::MIDNIGHT));
    }

    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(value, fmt).ok()
}
