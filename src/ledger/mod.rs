//! Persistent request ledger
//!
//! Records every running instance in `servers` and every observed HTTP
//! request in `requests`, both in one SQLite file:
//!
//! ```text
//! servers  1 ──── * requests
//! ```
//!
//! The ledger stays usable when the database is missing or broken: each
//! operation falls back to a sentinel (`0`, `false`, [`LedgerPage::NoData`])
//! and reports the failure through its [`LedgerObserver`].

pub mod error;
pub mod identity;
pub mod observer;
pub mod pagination;
pub mod store;

pub use error::LedgerError;
pub use identity::{
    identity_provider, HostIdentity, HostIdentityProvider, StaticHostIdentity, SystemHostIdentity,
};
pub use observer::{LedgerObserver, TracingObserver};
pub use pagination::{
    clamp_page_count, resolve_window, DEFAULT_PAGE_COUNT, DEFAULT_PAGE_START, MAX_PAGE_COUNT,
};
pub use store::{LedgerPage, LedgerStore, RequestRow, ServerRow};
