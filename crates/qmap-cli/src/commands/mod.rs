//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod route;
pub mod version;
