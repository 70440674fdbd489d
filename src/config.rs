//! Runtime settings resolved from the command line and environment.

use chrono::{Duration, Local, NaiveDate};

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::fields::Role;

/// What the rest of the program needs from the global flags.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Role to act as; `None` keeps the session default (manager).
    pub role: Option<Role>,
    /// Pinned calendar date for "now"; `None` uses the wall clock.
    pub as_of: Option<NaiveDate>,
    pub verbose: bool,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let as_of = match cli.as_of.as_deref() {
            Some(raw) => Some(
                parse_date_input(raw)
                    .ok_or_else(|| Error::Other(format!("Unrecognised --as-of date '{}'", raw)))?,
            ),
            None => None,
        };
        Ok(Settings {
            role: cli.role,
            as_of,
            verbose: cli.verbose,
        })
    }

    /// Clock the store should run on.
    pub fn clock(&self) -> Box<dyn Clock> {
        match self.as_of {
            Some(date) => Box::new(ManualClock::at_date(date)),
            None => Box::new(SystemClock),
        }
    }

    /// Default tracing directive when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "td=debug"
        } else {
            "warn"
        }
    }
}

/// Parse a human-readable date.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "in 3d", "in 2w", "3d ago", "2w ago"
/// - "YYYY-MM-DD" format
pub fn parse_date_input(s: &str) -> Option<NaiveDate> {
    parse_date_relative_to(s, Local::now().date_naive())
}

/// Same as `parse_date_input`, with relative forms counted from `today`.
pub fn parse_date_relative_to(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        return parse_span(rest).and_then(|span| today.checked_add_signed(span));
    }
    if let Some(rest) = s.strip_suffix(" ago") {
        return parse_span(rest).and_then(|span| today.checked_sub_signed(span));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn parse_span(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(n) = s.strip_suffix('d') {
        return n.trim().parse::<i64>().ok().and_then(Duration::try_days);
    }
    if let Some(n) = s.strip_suffix('w') {
        return n.trim().parse::<i64>().ok().and_then(Duration::try_weeks);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 24).unwrap()
    }

    #[test]
    fn test_parse_date_keywords() {
        assert_eq!(parse_date_relative_to("today", base()), Some(base()));
        assert_eq!(
            parse_date_relative_to(" Yesterday ", base()),
            NaiveDate::from_ymd_opt(2025, 1, 23)
        );
        assert_eq!(
            parse_date_relative_to("tomorrow", base()),
            NaiveDate::from_ymd_opt(2025, 1, 25)
        );
    }

    #[test]
    fn test_parse_date_spans() {
        assert_eq!(
            parse_date_relative_to("in 3d", base()),
            NaiveDate::from_ymd_opt(2025, 1, 27)
        );
        assert_eq!(
            parse_date_relative_to("2w ago", base()),
            NaiveDate::from_ymd_opt(2025, 1, 10)
        );
        assert_eq!(parse_date_relative_to("in soon", base()), None);
    }

    #[test]
    fn test_parse_date_rejects_out_of_range_spans() {
        assert_eq!(parse_date_relative_to("in 999999999d", base()), None);
        assert_eq!(parse_date_relative_to("9223372036854775807w ago", base()), None);
        assert_eq!(parse_date_relative_to("in 9223372036854775807d", base()), None);
    }

    #[test]
    fn test_out_of_range_as_of_is_an_error() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["td", "--as-of", "in 999999999d", "users"]).unwrap();
        assert!(matches!(Settings::from_cli(&cli), Err(Error::Other(_))));
    }

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(
            parse_date_relative_to("2025-02-01", base()),
            NaiveDate::from_ymd_opt(2025, 2, 1)
        );
        assert_eq!(parse_date_relative_to("01/02/2025", base()), None);
    }

    #[test]
    fn test_pinned_clock_uses_as_of_date() {
        let settings = Settings {
            role: None,
            as_of: Some(base()),
            verbose: false,
        };
        assert_eq!(settings.clock().today(), base());
        assert_eq!(settings.log_directive(), "warn");
    }
}
