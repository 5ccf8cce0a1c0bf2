//! # MIST Common Library
//!
//! Shared code for the MIST services:
//! - Error type shared across crates
//! - Configuration loading (TOML file, environment, compiled defaults)
//! - Human-readable duration formatting

pub mod config;
pub mod error;
pub mod human_time;

pub use error::{Error, Result};
