//! Database queries.

pub mod version;
