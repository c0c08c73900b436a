//! CLI command implementations.

pub mod backends;
pub mod classify;
pub mod common;
pub mod run;
pub mod sweep;
pub mod version;
