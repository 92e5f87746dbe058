//! Storage helpers for the service layer
//!
//! Reading, creating and overwriting the JSON documents that back each
//! collection. Knows nothing about collection kinds.

pub mod json_file;
