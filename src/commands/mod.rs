//! Command implementations for the CLI
//!
//! - start: Start the web server
//! - test: Test configuration validity
//! - config: Configuration display
//! - ledger: Read the request ledger offline

pub mod config;
pub mod ledger;
pub mod start;
pub mod test;
