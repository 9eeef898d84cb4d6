use std::path::PathBuf;
use thiserror::Error;

/// Internal failure of a ledger operation
///
/// Never leaves the store: public operations turn it into a sentinel result
/// and report it through the observer.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::MissingDirectory(PathBuf::from("/nope/db"));
        assert_eq!(err.to_string(), "database directory does not exist: /nope/db");

        let err = LedgerError::Unavailable("permission denied".to_string());
        assert_eq!(err.to_string(), "store unavailable: permission denied");
    }
}
