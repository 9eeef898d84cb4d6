//! Ledger event reporting
//!
//! The store never returns storage errors to its callers; it reports them
//! through a [`LedgerObserver`] handed to it at construction instead.

use std::path::Path;

/// Receives lifecycle and degradation events from the ledger store
pub trait LedgerObserver: Send + Sync {
    /// The backing database was opened and its schema is in place
    fn opened(&self, path: &Path);

    /// This instance was registered (or found) in the `servers` table
    fn registered(&self, server_id: i64);

    /// An operation fell back to its sentinel result
    fn degraded(&self, operation: &'static str, detail: &str);
}

/// Default observer that forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LedgerObserver for TracingObserver {
    fn opened(&self, path: &Path) {
        tracing::info!(database = %path.display(), "Request ledger opened");
    }

    fn registered(&self, server_id: i64) {
        tracing::info!(server_id, "Registered server identity");
    }

    fn degraded(&self, operation: &'static str, detail: &str) {
        tracing::warn!(operation, detail, "Request ledger operation degraded");
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_degraded_event_names_the_operation() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingObserver.degraded("total_requests", "no such table: requests");
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Request ledger operation degraded"));
        assert!(!output.contains("unavailable"));
        assert!(output.contains("operation=\"total_requests\""));
        assert!(output.contains("no such table: requests"));
    }
}
