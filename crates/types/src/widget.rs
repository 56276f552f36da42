//! Widget model for settings binding.
//!
//! A `Widget` carries the identity used to find its setting key and the
//! display state of one widget kind. The model is plain data: it can be
//! loaded from a layout file, driven headlessly, or mirrored onto toolkit
//! widgets.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A bindable widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Builder id of the widget
    #[serde(default)]
    pub buildable_name: Option<String>,
    /// Widget name, used when the builder id is missing or auto-generated
    #[serde(default)]
    pub name: Option<String>,
    /// Display state of the widget
    pub state: WidgetState,
    /// A "changed" notification is waiting to be handled
    #[serde(skip)]
    pending_change: bool,
}

impl Widget {
    /// Create a widget identified by its builder id
    pub fn new(buildable_name: &str, state: WidgetState) -> Self {
        Self {
            buildable_name: Some(buildable_name.to_string()),
            name: None,
            state,
            pending_change: false,
        }
    }

    /// Create a widget that only has a widget name
    pub fn with_widget_name(name: &str, state: WidgetState) -> Self {
        Self {
            buildable_name: None,
            name: Some(name.to_string()),
            state,
            pending_change: false,
        }
    }

    /// Settings key this widget binds to.
    ///
    /// Builder ids starting with "Gtk" are auto-generated, so the widget
    /// name is used for those instead.
    pub fn setting_key(&self) -> Option<&str> {
        match self.buildable_name.as_deref() {
            Some(id) if !id.starts_with("Gtk") => Some(id),
            _ => self.name.as_deref(),
        }
    }

    /// Mutable access to the display state as a user interaction.
    ///
    /// Marks the widget as changed, the way a toolkit would emit a
    /// "changed" signal after user input.
    pub fn interact(&mut self) -> &mut WidgetState {
        self.pending_change = true;
        &mut self.state
    }

    pub fn mark_changed(&mut self) {
        self.pending_change = true;
    }

    pub fn has_pending_change(&self) -> bool {
        self.pending_change
    }

    /// Clear and return the pending change flag
    pub fn take_pending_change(&mut self) -> bool {
        std::mem::take(&mut self.pending_change)
    }
}

/// Display state for each supported widget kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetState {
    Entry(EntryState),
    RadioButton(RadioState),
    CheckButton(ToggleState),
    ToggleToolButton(ToggleState),
    ToggleButton(ToggleState),
    CheckMenuItem(ToggleState),
    ComboBox(ComboBoxState),
    SpinButton(RangeState),
    Scale(ScaleState),
    ScaleButton(RangeState),
    TextView(TextViewState),
    Label(LabelState),
    FileChooserButton(FileChooserState),
    /// A widget kind that cannot be bound to a setting
    Unsupported { type_name: String },
}

impl WidgetState {
    /// Toolkit type name of this kind, for diagnostics
    pub fn type_name(&self) -> &str {
        match self {
            WidgetState::Entry(_) => "GtkEntry",
            WidgetState::RadioButton(_) => "GtkRadioButton",
            WidgetState::CheckButton(_) => "GtkCheckButton",
            WidgetState::ToggleToolButton(_) => "GtkToggleToolButton",
            WidgetState::ToggleButton(_) => "GtkToggleButton",
            WidgetState::CheckMenuItem(_) => "GtkCheckMenuItem",
            WidgetState::ComboBox(_) => "GtkComboBox",
            WidgetState::SpinButton(_) => "GtkSpinButton",
            WidgetState::Scale(_) => "GtkScale",
            WidgetState::ScaleButton(_) => "GtkScaleButton",
            WidgetState::TextView(_) => "GtkTextView",
            WidgetState::Label(_) => "GtkLabel",
            WidgetState::FileChooserButton(_) => "GtkFileChooserButton",
            WidgetState::Unsupported { type_name } => type_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryState {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleState {
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioState {
    pub active: bool,
    /// Inconsistent ("mixed") display, reads as false
    pub inconsistent: bool,
    /// Radio group; activating one member deactivates the others
    pub group: Option<String>,
}

/// One row of a combo box option list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboRow {
    /// Human readable label
    pub label: String,
    /// Machine readable option stored in settings
    pub short_opt: String,
    /// Numeric form of the option
    pub numeric: f64,
}

impl ComboRow {
    pub fn new(label: &str, short_opt: &str, numeric: f64) -> Self {
        Self {
            label: label.to_string(),
            short_opt: short_opt.to_string(),
            numeric,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboBoxState {
    pub rows: Vec<ComboRow>,
    /// Index of the selected row
    pub active: Option<usize>,
    /// Text of the free-text entry, for editable combos
    pub entry: Option<String>,
}

impl ComboBoxState {
    pub fn new(rows: Vec<ComboRow>) -> Self {
        Self {
            rows,
            active: None,
            entry: None,
        }
    }

    /// Same option list with a free-text entry
    pub fn editable(rows: Vec<ComboRow>) -> Self {
        Self {
            rows,
            active: None,
            entry: Some(String::new()),
        }
    }

    pub fn has_entry(&self) -> bool {
        self.entry.is_some()
    }

    pub fn active_row(&self) -> Option<&ComboRow> {
        self.active.and_then(|i| self.rows.get(i))
    }

    /// Select a row. Out of range indexes clear the selection.
    ///
    /// An editable combo shows the label of the selected row in its entry.
    pub fn set_active(&mut self, index: usize) {
        self.active = (index < self.rows.len()).then_some(index);
        if let (Some(i), Some(entry)) = (self.active, self.entry.as_mut()) {
            *entry = self.rows[i].label.clone();
        }
    }

    /// Replace the entry text. Typing into the entry deselects the active row.
    pub fn set_entry_text(&mut self, text: &str) {
        if let Some(entry) = self.entry.as_mut() {
            *entry = text.to_string();
            self.active = None;
        }
    }
}

/// Adjustment backed value (spin buttons and scale buttons)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeState {
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

impl RangeState {
    pub fn new(value: f64, lower: f64, upper: f64) -> Self {
        Self { value, lower, upper }
    }

    /// Set the value, clamped to the adjustment bounds
    pub fn set_value(&mut self, value: f64) {
        self.value = clamp(value, self.lower, self.upper);
    }
}

impl Default for RangeState {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleState {
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    /// Decimal digits displayed; zero means the scale holds integers
    pub digits: u32,
}

impl ScaleState {
    pub fn new(value: f64, lower: f64, upper: f64, digits: u32) -> Self {
        Self {
            value,
            lower,
            upper,
            digits,
        }
    }

    /// Set the value, rounded to `digits` decimal places and clamped
    pub fn set_value(&mut self, value: f64) {
        let scale = 10f64.powi(self.digits as i32);
        let rounded = (value * scale).round() / scale;
        self.value = clamp(rounded, self.lower, self.upper);
    }
}

impl Default for ScaleState {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextViewState {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelState {
    /// Displayed text, without markup
    pub text: String,
}

/// What a file chooser selects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChooserAction {
    #[default]
    Open,
    Save,
    SelectFolder,
    CreateFolder,
}

impl ChooserAction {
    /// Folder and save choosers take a path as-is
    pub fn takes_path_directly(self) -> bool {
        !matches!(self, ChooserAction::Open)
    }
}

#[cfg(feature = "gtk")]
impl From<gtk4::FileChooserAction> for ChooserAction {
    fn from(action: gtk4::FileChooserAction) -> Self {
        match action {
            gtk4::FileChooserAction::Save => ChooserAction::Save,
            gtk4::FileChooserAction::SelectFolder => ChooserAction::SelectFolder,
            _ => ChooserAction::Open,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChooserState {
    pub action: ChooserAction,
    pub filename: Option<PathBuf>,
    pub current_folder: Option<PathBuf>,
}

impl FileChooserState {
    pub fn new(action: ChooserAction) -> Self {
        Self {
            action,
            filename: None,
            current_folder: None,
        }
    }

    /// Select a file; the chooser also moves to the file's folder
    pub fn set_filename(&mut self, path: PathBuf) {
        self.current_folder = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from);
        self.filename = Some(path);
    }

    /// Change folder; this drops the current file selection
    pub fn set_current_folder(&mut self, path: PathBuf) {
        self.filename = None;
        self.current_folder = Some(path);
    }
}

fn clamp(value: f64, lower: f64, upper: f64) -> f64 {
    if upper < lower {
        return lower;
    }
    value.max(lower).min(upper)
}
