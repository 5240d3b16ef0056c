use chrono::NaiveDateTime;
use regex::Regex;
use crate::severity::Severity;

/// `YYYY-MM-DD HH:MM:SS.mmm <digits> LEVEL`, anchored at line start.
pub const LINE_PATTERN: &str = r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3})(\s\d+\s)(TRACE|DEBUG|INFO|WARNING|ERROR)";
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// One matched log line. Two lines with equal tuples are the same record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub separator: String,
    pub severity: Severity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchFailure {
    /// The line does not start with the record prefix.
    NoMatch,
    /// Prefix matched but the digits are not a real calendar time.
    BadTimestamp(String),
}

pub struct LineMatcher {
    re: Regex,
}

impl LineMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self { re: Regex::new(LINE_PATTERN)? })
    }

    /// Raw captures: timestamp text, spacer span, severity token.
    pub fn captures<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str, &'a str)> {
        let caps = self.re.captures(line)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str(), caps.get(3)?.as_str()))
    }

    pub fn match_line(&self, line: &str) -> Result<LogRecord, MatchFailure> {
        let (ts, sep, level) = self.captures(line).ok_or(MatchFailure::NoMatch)?;
        let timestamp = NaiveDateTime::parse_from_str(ts, RECORD_TIME_FORMAT).map_err(|_| MatchFailure::BadTimestamp(ts.to_string()))?;
        // the pattern only admits the five tokens
        let severity = level.parse::<Severity>().map_err(|_| MatchFailure::NoMatch)?;
        Ok(LogRecord { timestamp, separator: sep.to_string(), severity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn matches_record_prefix() {
        let m = LineMatcher::new().unwrap();
        let r = m.match_line("2023-01-01 10:00:00.123 42 INFO foo").unwrap();
        assert_eq!(r.severity, Severity::Info);
        assert_eq!(r.separator, " 42 ");
        assert_eq!(r.timestamp.nanosecond(), 123_000_000);
        assert_eq!(m.captures("2023-01-01 10:00:01.456 43 ERROR bar"), Some(("2023-01-01 10:00:01.456", " 43 ", "ERROR")));
    }

    #[test]
    fn all_five_levels_match() {
        let m = LineMatcher::new().unwrap();
        for sev in Severity::ALL {
            let line = format!("2024-05-06 07:08:09.010 1 {} message", sev.token());
            assert_eq!(m.match_line(&line).unwrap().severity, sev);
        }
    }

    #[test]
    fn non_record_lines_do_not_match() {
        let m = LineMatcher::new().unwrap();
        let lines = [
            "not a log line",
            "",
            " 2023-01-01 10:00:00.123 42 INFO leading space",
            "2023-01-01 10:00:00 42 INFO no millis",
            "2023-01-01 10:00:00.123 INFO no spacer digits",
            "2023-01-01 10:00:00.123 42 CRITICAL other level",
            "2023-01-01 10:00:00.123 42 info lowercase",
            "Traceback: 2023-01-01 10:00:00.123 42 ERROR embedded",
        ];
        for l in lines { assert_eq!(m.match_line(l), Err(MatchFailure::NoMatch), "{}", l); }
    }

    #[test]
    fn impossible_calendar_time_is_rejected() {
        let m = LineMatcher::new().unwrap();
        assert_eq!(m.match_line("2023-13-01 10:00:00.123 42 INFO x"), Err(MatchFailure::BadTimestamp("2023-13-01 10:00:00.123".to_string())));
    }

    #[test]
    fn trailing_content_is_ignored() {
        let m = LineMatcher::new().unwrap();
        let a = m.match_line("2023-01-01 10:00:00.123 42 WARNING first text").unwrap();
        let b = m.match_line("2023-01-01 10:00:00.123 42 WARNING different text").unwrap();
        assert_eq!(a, b);
    }
}
