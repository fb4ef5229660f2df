//! Configuration module for detector settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`Settings`)
//! - YAML loading functionality (`load_settings`)
//! - Logging configuration (`init_logging`)

mod loader;
pub mod logging;
mod types;

// Re-export types
pub use types::Settings;

// Re-export loader functions
pub use loader::{load_settings, load_settings_from_str};

// Re-export logging functions
pub use logging::init_logging;
