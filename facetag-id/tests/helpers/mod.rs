//! Test Helper Utilities
//!
//! Shared utilities for facetag-id integration tests

#![allow(dead_code)]

pub mod fake_server;
pub mod log_capture;

pub use fake_server::{FakeServer, Reply};
pub use log_capture::capture_logs;
