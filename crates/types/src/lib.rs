//! transcode-settings-types: Shared data types for transcode-settings.
//!
//! This crate contains the settings tree accessors, the coercions between
//! dynamic setting values and scalar representations, and the widget model.
//! None of it depends on GTK unless the `gtk` feature is enabled.

pub mod job;
pub mod value;
pub mod widget;

// Re-export commonly used types at the crate root for convenience
pub use job::Settings;
pub use value::{get_bool, get_double, get_int, string_xform, value_type, ValueType};
pub use widget::{
    ChooserAction, ComboBoxState, ComboRow, EntryState, FileChooserState, LabelState, RadioState,
    RangeState, ScaleState, TextViewState, ToggleState, Widget, WidgetState,
};
