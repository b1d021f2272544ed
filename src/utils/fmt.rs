//! ## fmt
//!
//! format utilities

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Format time using fmt string in utc time
pub fn fmt_time_utc(time: SystemTime, fmt: &str) -> String {
    let datetime: DateTime<Utc> = time.into();
    format!("{}", datetime.format(fmt))
}

/// Current utc time, as printed in connection logs
pub fn now_utc() -> String {
    fmt_time_utc(SystemTime::now(), "%Y-%m-%d %H:%M:%S")
}
