//! File-backed implementations of the service traits.

pub mod record_store;
