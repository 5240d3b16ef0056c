use serde::Serialize;
use crate::matcher::LogRecord;
use crate::severity::Severity;
use crate::window::TimeWindow;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub traces: usize,
    pub debugs: usize,
    pub infos: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl SeverityCounts {
    pub fn bump(&mut self, sev: Severity) {
        match sev {
            Severity::Trace => self.traces += 1,
            Severity::Debug => self.debugs += 1,
            Severity::Info => self.infos += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
    }

    pub fn get(&self, sev: Severity) -> usize {
        match sev { Severity::Trace => self.traces, Severity::Debug => self.debugs, Severity::Info => self.infos, Severity::Warning => self.warnings, Severity::Error => self.errors }
    }

    /// Counts in report order.
    pub fn values(&self) -> [usize; 5] { Severity::ALL.map(|s| self.get(s)) }

    pub fn total(&self) -> usize { self.values().iter().sum() }
}

pub fn count<'a>(records: impl IntoIterator<Item = &'a LogRecord>, window: &TimeWindow) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for r in records {
        if window.contains(r.timestamp) { counts.bump(r.severity); }
    }
    counts
}
