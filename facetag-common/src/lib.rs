//! # facetag Common Library
//!
//! Shared code for the facetag workspace:
//! - Error type used by configuration loading
//! - TOML configuration model and config file discovery
//! - Logging configuration

pub mod config;
pub mod error;

pub use error::{Error, Result};
