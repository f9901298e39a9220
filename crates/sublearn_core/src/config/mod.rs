//! Configuration management.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! Settings are plain values passed into [`crate::pipeline::run`] and
//! [`crate::batch::BatchProcessor`]; nothing reads them from global state.
//!
//! # Example
//!
//! ```no_run
//! use sublearn_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/sublearn.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Output suffix: {}", config.settings().paths.output_suffix);
//!
//! // Modify a setting
//! config.settings_mut().batch.workers = 4;
//!
//! // Save just the batch section atomically
//! config.update_section(ConfigSection::Batch).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    AlignSettings, BatchSettings, ComposeSettings, ConfigSection, DocumentSettings,
    LoggingSettings, ParseSettings, PathSettings, Settings, StyleSettings, StyleSpec,
};
