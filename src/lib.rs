//! Cross-venue spread detector
//!
//! Watches live ticker streams on several trading venues, compares quotes
//! for the same instrument across venues, and tracks every qualifying
//! spread as an opportunity with an open/update/close lifecycle.

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;

pub use error::AppError;
