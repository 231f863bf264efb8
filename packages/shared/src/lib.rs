//! Shared utilities for the liveboard server and client binaries.

pub mod logger;
pub mod time;
