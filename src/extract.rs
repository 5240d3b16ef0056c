use std::collections::HashSet;
use std::path::Path;
use crate::error::{Result, TallyError};
use crate::matcher::{LineMatcher, LogRecord, MatchFailure};

#[derive(Clone, Debug, Default)]
pub struct Extraction {
    pub records: HashSet<LogRecord>,
    pub lines: usize,
    pub matched: usize,
}

/// Reads the whole file and returns the unique records it contains.
pub fn extract(path: &Path, matcher: &LineMatcher) -> Result<Extraction> {
    let data = std::fs::read(path).map_err(|e| TallyError::Read { path: path.to_string_lossy().into_owned(), source: e })?;
    let text = String::from_utf8_lossy(&data);
    if matches!(text, std::borrow::Cow::Owned(_)) { log::warn!("{} is not valid UTF-8; invalid bytes were replaced", path.to_string_lossy()); }
    let out = extract_text(&text, matcher);
    log::info!("Scanned {} lines in {}: {} matched, {} unique records", out.lines, path.to_string_lossy(), out.matched, out.records.len());
    Ok(out)
}

pub fn extract_text(text: &str, matcher: &LineMatcher) -> Extraction {
    let mut out = Extraction::default();
    for line in text.lines() {
        out.lines += 1;
        match matcher.match_line(line) {
            Ok(rec) => {
                log::trace!("line {}: {}{}{}", out.lines, rec.timestamp, rec.separator, rec.severity);
                out.matched += 1;
                out.records.insert(rec);
            }
            Err(MatchFailure::BadTimestamp(ts)) => log::debug!("Skipping line {} with invalid timestamp {}", out.lines, ts),
            Err(MatchFailure::NoMatch) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    const SAMPLE: &str = "2023-01-01 10:00:00.123 42 INFO foo\n2023-01-01 10:00:01.456 43 ERROR bar\nnot a log line\n2023-01-01 10:00:00.123 42 INFO foo\n";

    #[test]
    fn duplicates_collapse() {
        let m = LineMatcher::new().unwrap();
        let ex = extract_text(SAMPLE, &m);
        assert_eq!(ex.lines, 4);
        assert_eq!(ex.matched, 3);
        assert_eq!(ex.records.len(), 2);
        assert_eq!(ex.records.iter().filter(|r| r.severity == Severity::Info).count(), 1);
    }

    #[test]
    fn differing_spacer_is_a_distinct_record() {
        let m = LineMatcher::new().unwrap();
        let ex = extract_text("2023-01-01 10:00:00.123 42 INFO a\n2023-01-01 10:00:00.123 43 INFO a\n", &m);
        assert_eq!(ex.records.len(), 2);
    }

    #[test]
    fn crlf_lines_match() {
        let m = LineMatcher::new().unwrap();
        let ex = extract_text("2023-01-01 10:00:00.123 42 DEBUG a\r\n2023-01-01 10:00:00.124 42 TRACE b\r\n", &m);
        assert_eq!(ex.records.len(), 2);
    }

    #[test]
    fn reads_file_from_disk() {
        let p = std::env::temp_dir().join("logtally_extract_test.log");
        std::fs::write(&p, SAMPLE).unwrap();
        let m = LineMatcher::new().unwrap();
        let ex = extract(&p, &m).unwrap();
        assert_eq!(ex.records.len(), 2);
        let _ = std::fs::remove_file(&p);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let p = std::env::temp_dir().join("logtally_extract_lossy.log");
        let mut data = b"2023-01-01 10:00:00.123 42 WARNING \xff\xfe\n".to_vec();
        data.extend_from_slice(b"\xff garbage\n");
        std::fs::write(&p, data).unwrap();
        let m = LineMatcher::new().unwrap();
        let ex = extract(&p, &m).unwrap();
        assert_eq!(ex.records.len(), 1);
        let _ = std::fs::remove_file(&p);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let p = std::env::temp_dir().join("logtally_definitely_missing.log");
        let _ = std::fs::remove_file(&p);
        let m = LineMatcher::new().unwrap();
        assert!(matches!(extract(&p, &m), Err(TallyError::Read { .. })));
    }
}
