//! Expiry badges, debounced table filtering and location helpers for the
//! Food Rescue donation board.

pub mod cli;
pub mod config;
pub mod debounce;
pub mod error;
pub mod expiry;
pub mod filter;
pub mod geo;
pub mod listing;
pub mod notify;
pub mod urgency;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use error::{Error, Result};
