use chrono::NaiveDateTime;
use crate::error::{Result, TallyError};

pub const CLI_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Optional bounds on record timestamps. Both bounds are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

pub fn parse_cli_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), CLI_TIME_FORMAT).map_err(|_| TallyError::InvalidTimestamp { value: s.to_string() })
}

impl TimeWindow {
    /// Validates `start < end` when both are present.
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) && s >= e {
            return Err(TallyError::InvalidWindow { start: s.format(CLI_TIME_FORMAT).to_string(), end: e.format(CLI_TIME_FORMAT).to_string() });
        }
        Ok(Self { start, end })
    }

    pub fn from_args(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = start.map(parse_cli_time).transpose()?;
        let end = end.map(parse_cli_time).transpose()?;
        Self::new(start, end)
    }

    pub fn is_unbounded(&self) -> bool { self.start.is_none() && self.end.is_none() }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        if let Some(s) = self.start && ts <= s { return false; }
        if let Some(e) = self.end && ts >= e { return false; }
        true
    }

    pub fn describe(&self) -> String {
        match (self.start, self.end) {
            (None, None) => "From start till end of the file".to_string(),
            (Some(s), Some(e)) => format!("From {} to {}", s.format(CLI_TIME_FORMAT), e.format(CLI_TIME_FORMAT)),
            (Some(s), None) => format!("From {} till the end of log", s.format(CLI_TIME_FORMAT)),
            (None, Some(e)) => format!("From start of log file till {}", e.format(CLI_TIME_FORMAT)),
        }
    }
}
