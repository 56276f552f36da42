//! transcode-settings: binds transcode job settings to GUI widgets
//!
//! This library provides:
//! - Accessors for the nested sections of a job settings tree
//! - Reading widget state into typed setting values and writing values back
//! - Orchestration that keeps the settings tree in step with the widgets
//! - Configuration for the command line front end

pub mod config;
pub mod ui;

// Re-export commonly used types
pub use config::AppConfig;
pub use transcode_settings_types::{job, value, Settings, Widget, WidgetState};
pub use ui::{BindingError, UiContext, WidgetRegistry};
