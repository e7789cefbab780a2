//! Adapter implementations
//!
//! Adapters provide the concrete technologies behind the services:
//! - DuckDB for users, profiles, thoughts, sessions and raw lookups
//! - Local filesystem for the MediaStore port

pub mod duckdb;
pub mod media;
