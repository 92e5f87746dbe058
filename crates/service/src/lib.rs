//! Service layer for the portfolio backend.
//! - Static collection table and record shapes (`collections`).
//! - Id allocation (`ids`).
//! - File-backed record store (`file::record_store`) behind the
//!   `repository::RecordRepository` trait the HTTP layer depends on.

pub mod errors;
pub mod collections;
pub mod ids;
pub mod runtime;
pub mod storage;
pub mod file;
pub mod repository;

pub use collections::{CollectionKind, CollectionSpec, Record, PORTFOLIO_COLLECTIONS};
pub use file::record_store::{FileRecordStore, LoadOutcome};
pub use repository::RecordRepository;
