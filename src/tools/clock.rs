//! Wall-clock tool.
//!
//! Relative phrases like "this weekend" only make sense once the model knows
//! today's date, so the agent is prompted to call this first.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;

use crate::error::Result;
use crate::tool::Tool;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Returns the current local time as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockTool;

impl ClockTool {
    pub fn now(&self) -> String {
        format_timestamp(&Local::now())
    }
}

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "get_current_datetime"
    }

    fn description(&self) -> &str {
        "Get the current date and time in YYYY-MM-DD HH:MM:SS format, e.g. \"2026-02-07 14:30:45\". Takes no arguments."
    }

    async fn call(&self, _input: Value) -> Result<String> {
        let now = self.now();
        tracing::debug!(now = %now, "read clock");
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use regex::Regex;

    #[test]
    fn formats_with_zero_padding() {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .from_utc_datetime(
                &NaiveDate::from_ymd_opt(2026, 2, 7)
                    .unwrap()
                    .and_hms_opt(4, 5, 6)
                    .unwrap(),
            );

        assert_eq!(format_timestamp(&at), "2026-02-07 04:05:06");
    }

    #[tokio::test]
    async fn output_matches_fixed_format_and_never_goes_backwards() {
        let pattern = Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").unwrap();
        let clock = ClockTool;

        let mut previous = String::new();
        for _ in 0..5 {
            let now = clock.call(Value::Null).await.unwrap();
            assert!(pattern.is_match(&now), "unexpected format: {now}");
            // Fixed-width fields make lexical order match chronological order.
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn declares_no_parameters() {
        assert!(ClockTool.parameters().is_empty());
    }
}
