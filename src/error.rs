use thiserror::Error;

#[derive(Debug, Error)]
pub enum TallyError {
    #[error("Given datetime is not valid: '{value}' (expected format - 'YYYY-MM-DD HH:MM:SS')")]
    InvalidTimestamp { value: String },

    #[error("End time must be greater than start time (start {start}, end {end})")]
    InvalidWindow { start: String, end: String },

    #[error("failed to read log file {path}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to write {path}")]
    Write { path: String, #[source] source: std::io::Error },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_cause_is_printed_once() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file here");
        let err = anyhow::Error::from(TallyError::Read { path: "nope.log".to_string(), source });
        let msg = format!("{:#}", err);
        assert_eq!(msg, "failed to read log file nope.log: no such file here");
        assert_eq!(msg.matches("no such file here").count(), 1);
    }

    #[test]
    fn write_error_keeps_source_chain() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = TallyError::Write { path: "out.html".to_string(), source };
        assert_eq!(err.to_string(), "failed to write out.html");
        assert_eq!(std::error::Error::source(&err).map(|e| e.to_string()), Some("denied".to_string()));
    }
}
