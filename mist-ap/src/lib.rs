//! mist-ap library
//!
//! Sound-effects catalog player: scrapes the catalog, plays sounds through
//! whichever external player is installed and serves both over HTTP.

pub mod api;
pub mod catalog;
pub mod error;
pub mod playback;
pub mod service;

pub use error::{Error, Result};
