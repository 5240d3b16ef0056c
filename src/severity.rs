use std::fmt;
use std::str::FromStr;

/// Log level token captured from a matched line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity { Trace, Debug, Info, Warning, Error }

impl Severity {
    /// Report order: Traces, Debugs, Infos, Warnings, Errors.
    pub const ALL: [Severity; 5] = [Severity::Trace, Severity::Debug, Severity::Info, Severity::Warning, Severity::Error];

    pub fn token(self) -> &'static str {
        match self { Severity::Trace => "TRACE", Severity::Debug => "DEBUG", Severity::Info => "INFO", Severity::Warning => "WARNING", Severity::Error => "ERROR" }
    }

    pub fn label(self) -> &'static str {
        match self { Severity::Trace => "Traces", Severity::Debug => "Debugs", Severity::Info => "Infos", Severity::Warning => "Warnings", Severity::Error => "Errors" }
    }

    // ANSI code used when painting console labels.
    pub fn color_code(self) -> &'static str {
        match self { Severity::Trace => "2", Severity::Debug => "36", Severity::Info => "34", Severity::Warning => "33", Severity::Error => "1;31" }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.token()) }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL.into_iter().find(|sev| sev.token() == s).ok_or_else(|| format!("unknown severity: {}", s))
    }
}
