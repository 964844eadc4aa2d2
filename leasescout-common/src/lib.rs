//! # LeaseScout Common Library
//!
//! Shared code for the LeaseScout crates:
//! - Error type
//! - Configuration loading and secret resolution
//! - Progress event types and EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
