use std::path::PathBuf;

/// File-level failures. Per-row problems never surface here; they become
/// absent values in the emitted records.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("Read error: {0}")]
    Read(String),
    #[error("Read error: sheet not found: {0}")]
    SheetNotFound(String),
    #[error("No usable sheet found: {0}")]
    NoCandidate(String),
}

impl NormalizeError {
    /// Process exit code expected by callers of the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            NormalizeError::InputNotFound(_) => 2,
            NormalizeError::Read(_) | NormalizeError::SheetNotFound(_) => 3,
            NormalizeError::NoCandidate(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(NormalizeError::InputNotFound(PathBuf::from("x.xls")).exit_code(), 2);
        assert_eq!(NormalizeError::Read("bad zip".into()).exit_code(), 3);
        assert_eq!(NormalizeError::SheetNotFound("Lista".into()).exit_code(), 3);
        assert_eq!(NormalizeError::NoCandidate("no sheets".into()).exit_code(), 4);
    }

    #[test]
    fn test_input_not_found_message() {
        let err = NormalizeError::InputNotFound(PathBuf::from("/tmp/missing.xls"));
        assert_eq!(err.to_string(), "File not found: /tmp/missing.xls");
    }
}
