//! Common utilities module
//!
//! This module contains shared utilities used across the eye pipeline.

pub mod error;

pub use error::{LocalizationError, Result};
