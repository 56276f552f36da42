//! Conversion between widget display state and setting values
//!
//! Reading turns a widget into a typed `Value`; writing projects a `Value`
//! onto the widget kind's display state. Each widget kind implements
//! [`Marshal`], and [`WidgetState`] dispatches to it.

use log::{debug, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

use transcode_settings_types::value::{get_bool, get_double, get_int, string_xform, value_type};
use transcode_settings_types::widget::{
    ComboBoxState, EntryState, FileChooserState, LabelState, RadioState, RangeState, ScaleState,
    TextViewState, ToggleState,
};
use transcode_settings_types::{Settings, Widget, WidgetState};

use super::markup::strip_markup;

/// Scalar projections of a setting value, computed once per write
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub text: String,
    pub int: i64,
    pub double: f64,
}

impl Projection {
    /// Project a value. Null and aggregate values have no projection.
    pub fn of(value: &Value) -> Option<Self> {
        let ty = value_type(value);
        if ty.is_aggregate() || value.is_null() {
            return None;
        }
        Some(Self {
            text: string_xform(value).unwrap_or_default(),
            int: get_int(value),
            double: get_double(value),
        })
    }
}

/// Read/write behaviour of one widget kind
pub trait Marshal {
    /// Current display state as a setting value
    fn read(&self) -> Value;

    /// Show the projected value.
    ///
    /// Returns true if the widget would emit a change notification.
    fn write(&mut self, value: &Projection) -> bool;
}

impl Marshal for EntryState {
    fn read(&self) -> Value {
        Value::String(self.text.clone())
    }

    fn write(&mut self, value: &Projection) -> bool {
        replace(&mut self.text, value.text.clone())
    }
}

impl Marshal for RadioState {
    fn read(&self) -> Value {
        Value::Bool(self.active && !self.inconsistent)
    }

    fn write(&mut self, value: &Projection) -> bool {
        // Radio buttons are only ever switched on; the group switches the rest off
        if value.int != 0 {
            replace(&mut self.active, true)
        } else {
            false
        }
    }
}

impl Marshal for ToggleState {
    fn read(&self) -> Value {
        Value::Bool(self.active)
    }

    fn write(&mut self, value: &Projection) -> bool {
        replace(&mut self.active, value.int != 0)
    }
}

impl Marshal for ComboBoxState {
    fn read(&self) -> Value {
        if let Some(row) = self.active_row() {
            Value::String(row.short_opt.clone())
        } else {
            Value::String(self.entry.clone().unwrap_or_default())
        }
    }

    fn write(&mut self, value: &Projection) -> bool {
        let before = (self.active, self.entry.clone());

        match combo_row_index(self, value) {
            Some(index) => self.set_active(index),
            None if self.has_entry() => self.set_entry_text(&value.text),
            None => self.set_active(0),
        }

        before != (self.active, self.entry.clone())
    }
}

/// Row of a combo that a value selects: the first row whose short option
/// matches the text (ignoring ASCII case), else the first row whose numeric
/// form matches the integer or double projection.
pub fn combo_row_index(combo: &ComboBoxState, value: &Projection) -> Option<usize> {
    let by_option = combo
        .rows
        .iter()
        .position(|row| row.short_opt.eq_ignore_ascii_case(&value.text));
    by_option.or_else(|| {
        combo
            .rows
            .iter()
            .position(|row| row.numeric as i64 == value.int || row.numeric == value.double)
    })
}

impl Marshal for RangeState {
    fn read(&self) -> Value {
        Value::from(self.value)
    }

    fn write(&mut self, value: &Projection) -> bool {
        let before = self.value;
        self.set_value(value.double);
        before != self.value
    }
}

impl Marshal for ScaleState {
    fn read(&self) -> Value {
        if self.digits == 0 {
            Value::from(self.value as i64)
        } else {
            Value::from(self.value)
        }
    }

    fn write(&mut self, value: &Projection) -> bool {
        let before = self.value;
        self.set_value(value.double);
        before != self.value
    }
}

impl Marshal for TextViewState {
    fn read(&self) -> Value {
        Value::String(self.text.clone())
    }

    fn write(&mut self, value: &Projection) -> bool {
        // Buffer notifications stay blocked while the settings side writes,
        // otherwise the change handler would read the buffer straight back.
        self.text = value.text.clone();
        false
    }
}

impl Marshal for LabelState {
    fn read(&self) -> Value {
        Value::String(self.text.clone())
    }

    fn write(&mut self, value: &Projection) -> bool {
        replace(&mut self.text, strip_markup(&value.text))
    }
}

impl Marshal for FileChooserState {
    fn read(&self) -> Value {
        let path = self.filename.as_ref().or(self.current_folder.as_ref());
        Value::String(
            path.map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )
    }

    fn write(&mut self, value: &Projection) -> bool {
        if value.text.is_empty() {
            return false;
        }
        let before = (self.filename.clone(), self.current_folder.clone());
        let path = PathBuf::from(&value.text);

        if self.action.takes_path_directly() {
            self.set_filename(path);
        } else if path.is_dir() {
            self.set_current_folder(path);
        } else if path.exists() {
            self.set_filename(path);
        } else {
            self.set_current_folder(parent_dir(&path));
        }

        before != (self.filename.clone(), self.current_folder.clone())
    }
}

/// Directory part of a path, "." when there is none
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => path.to_path_buf(),
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl Marshal for WidgetState {
    fn read(&self) -> Value {
        self.as_marshal().map(|m| m.read()).unwrap_or(Value::Null)
    }

    fn write(&mut self, value: &Projection) -> bool {
        self.as_marshal_mut().map(|m| m.write(value)).unwrap_or(false)
    }
}

/// Access to the per-kind [`Marshal`] implementation
pub trait AsMarshal {
    fn as_marshal(&self) -> Option<&dyn Marshal>;
    fn as_marshal_mut(&mut self) -> Option<&mut dyn Marshal>;
}

impl AsMarshal for WidgetState {
    fn as_marshal(&self) -> Option<&dyn Marshal> {
        let marshal: &dyn Marshal = match self {
            WidgetState::Entry(s) => s,
            WidgetState::RadioButton(s) => s,
            WidgetState::CheckButton(s)
            | WidgetState::ToggleToolButton(s)
            | WidgetState::ToggleButton(s)
            | WidgetState::CheckMenuItem(s) => s,
            WidgetState::ComboBox(s) => s,
            WidgetState::SpinButton(s) | WidgetState::ScaleButton(s) => s,
            WidgetState::Scale(s) => s,
            WidgetState::TextView(s) => s,
            WidgetState::Label(s) => s,
            WidgetState::FileChooserButton(s) => s,
            WidgetState::Unsupported { .. } => return None,
        };
        Some(marshal)
    }

    fn as_marshal_mut(&mut self) -> Option<&mut dyn Marshal> {
        let marshal: &mut dyn Marshal = match self {
            WidgetState::Entry(s) => s,
            WidgetState::RadioButton(s) => s,
            WidgetState::CheckButton(s)
            | WidgetState::ToggleToolButton(s)
            | WidgetState::ToggleButton(s)
            | WidgetState::CheckMenuItem(s) => s,
            WidgetState::ComboBox(s) => s,
            WidgetState::SpinButton(s) | WidgetState::ScaleButton(s) => s,
            WidgetState::Scale(s) => s,
            WidgetState::TextView(s) => s,
            WidgetState::Label(s) => s,
            WidgetState::FileChooserButton(s) => s,
            WidgetState::Unsupported { .. } => return None,
        };
        Some(marshal)
    }
}

/// Current value of a widget.
///
/// Returns `None` for widget kinds that cannot be bound to a setting.
pub fn widget_value(widget: &Widget) -> Option<Value> {
    match widget.state.as_marshal() {
        Some(m) => Some(m.read()),
        None => {
            warn!(
                "Attempt to get unknown widget type {}, name {}",
                widget.state.type_name(),
                widget.setting_key().unwrap_or("<unnamed>")
            );
            None
        }
    }
}

pub fn widget_string(widget: &Widget) -> String {
    widget_value(widget)
        .and_then(|v| string_xform(&v))
        .unwrap_or_default()
}

pub fn widget_double(widget: &Widget) -> f64 {
    widget_value(widget).map(|v| get_double(&v)).unwrap_or(0.0)
}

pub fn widget_int(widget: &Widget) -> i64 {
    widget_value(widget).map(|v| get_int(&v)).unwrap_or(0)
}

pub fn widget_bool(widget: &Widget) -> bool {
    widget_value(widget).map(|v| get_bool(&v)).unwrap_or(false)
}

/// Store a widget's value in `settings` under the widget's setting key
pub fn widget_to_setting(settings: &mut Settings, widget: &Widget) {
    let Some(key) = widget.setting_key() else {
        debug!("Widget has no setting key");
        return;
    };
    match widget_value(widget) {
        Some(value) => {
            settings.insert(key.to_string(), value);
        }
        None => debug!("No value found for {}", key),
    }
}

/// Show `value` in `widget`.
///
/// Arrays, dictionaries and null are not bound to widgets and leave the
/// widget untouched.
pub fn update_widget(widget: &mut Widget, value: &Value) {
    let Some(projection) = Projection::of(value) else {
        return;
    };
    match widget.state.as_marshal_mut() {
        Some(m) => {
            if m.write(&projection) {
                widget.mark_changed();
            }
        }
        None => warn!(
            "Attempt to set unknown widget type {}, name {}",
            widget.state.type_name(),
            widget.setting_key().unwrap_or("<unnamed>")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use transcode_settings_types::widget::{ChooserAction, ComboRow};

    fn presets_combo(editable: bool) -> WidgetState {
        let rows = vec![
            ComboRow::new("Option A", "a", 5.0),
            ComboRow::new("Option B", "b", 7.0),
            ComboRow::new("Option C", "c", 9.5),
        ];
        WidgetState::ComboBox(if editable {
            ComboBoxState::editable(rows)
        } else {
            ComboBoxState::new(rows)
        })
    }

    fn combo_active(widget: &Widget) -> Option<usize> {
        match &widget.state {
            WidgetState::ComboBox(combo) => combo.active,
            _ => None,
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("transcode-settings-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn chooser(widget: &Widget) -> &FileChooserState {
        match &widget.state {
            WidgetState::FileChooserButton(fc) => fc,
            other => panic!("not a file chooser: {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_scalar_widgets() {
        let cases = vec![
            (WidgetState::Entry(EntryState::default()), json!("Big Buck Bunny")),
            (WidgetState::CheckButton(ToggleState::default()), json!(true)),
            (WidgetState::ToggleButton(ToggleState::default()), json!(true)),
            (WidgetState::ToggleToolButton(ToggleState { active: true }), json!(false)),
            (WidgetState::CheckMenuItem(ToggleState::default()), json!(true)),
            (WidgetState::RadioButton(RadioState::default()), json!(true)),
            (WidgetState::SpinButton(RangeState::new(0.0, 0.0, 51.0)), json!(22.5)),
            (WidgetState::ScaleButton(RangeState::new(0.0, 0.0, 10.0)), json!(2.5)),
            (WidgetState::Scale(ScaleState::new(0.0, 0.0, 51.0, 2)), json!(20.25)),
            (WidgetState::Scale(ScaleState::new(0.0, 0.0, 51.0, 0)), json!(20)),
            (WidgetState::TextView(TextViewState::default()), json!("line one\nline two")),
            (WidgetState::Label(LabelState::default()), json!("1920x1080")),
            (presets_combo(false), json!("c")),
            (presets_combo(true), json!("custom")),
        ];

        for (state, value) in cases {
            let mut widget = Widget::new("w", state);
            update_widget(&mut widget, &value);
            assert_eq!(widget_value(&widget), Some(value.clone()), "{:?}", widget.state);
        }
    }

    #[test]
    fn test_read_types() {
        let spin = Widget::new("q", WidgetState::SpinButton(RangeState::new(20.0, 0.0, 51.0)));
        assert_eq!(widget_value(&spin), Some(json!(20.0)));

        let scale = Widget::new("q", WidgetState::Scale(ScaleState::new(20.9, 0.0, 51.0, 0)));
        assert_eq!(widget_value(&scale), Some(json!(20)));
        assert_eq!(widget_int(&scale), 20);

        let scale = Widget::new("q", WidgetState::Scale(ScaleState::new(20.5, 0.0, 51.0, 1)));
        assert_eq!(widget_value(&scale), Some(json!(20.5)));
        assert_eq!(widget_string(&scale), "20.5");
    }

    #[test]
    fn test_scale_write_rounds_to_digits() {
        let mut scale = Widget::new("q", WidgetState::Scale(ScaleState::new(0.0, 0.0, 51.0, 0)));
        update_widget(&mut scale, &json!(30.7));
        assert_eq!(widget_value(&scale), Some(json!(31)));

        let mut scale = Widget::new("q", WidgetState::Scale(ScaleState::new(0.0, 0.0, 51.0, 1)));
        update_widget(&mut scale, &json!(20.26));
        assert_eq!(widget_value(&scale), Some(json!(20.3)));
    }

    #[test]
    fn test_radio_inconsistent_reads_false() {
        let widget = Widget::new(
            "AudioTrackGroup",
            WidgetState::RadioButton(RadioState {
                active: true,
                inconsistent: true,
                group: None,
            }),
        );
        assert_eq!(widget_value(&widget), Some(json!(false)));
        assert!(!widget_bool(&widget));
    }

    #[test]
    fn test_radio_write_never_deactivates() {
        let mut widget = Widget::new("r", WidgetState::RadioButton(RadioState { active: true, ..Default::default() }));
        update_widget(&mut widget, &json!(false));
        assert_eq!(widget_value(&widget), Some(json!(true)));
    }

    #[test]
    fn test_unsupported_widget_reads_none() {
        let mut settings = Settings::new();
        let widget = Widget::new(
            "queue_list",
            WidgetState::Unsupported {
                type_name: "GtkTreeView".to_string(),
            },
        );
        assert_eq!(widget_value(&widget), None);
        assert_eq!(widget_string(&widget), "");
        assert_eq!(widget_double(&widget), 0.0);

        widget_to_setting(&mut settings, &widget);
        assert!(settings.is_empty());
    }

    #[test]
    fn test_unsupported_widget_ignores_writes() {
        let mut widget = Widget::new("w", WidgetState::Unsupported { type_name: "GtkImage".into() });
        let before = widget.clone();
        update_widget(&mut widget, &json!("x"));
        assert_eq!(widget, before);
    }

    #[test]
    fn test_aggregates_are_not_written() {
        let mut widget = Widget::new("w", WidgetState::Entry(EntryState { text: "keep".into() }));
        update_widget(&mut widget, &json!({"a": 1}));
        update_widget(&mut widget, &json!(["a"]));
        update_widget(&mut widget, &json!(null));
        assert_eq!(widget_string(&widget), "keep");
        assert!(!widget.has_pending_change());
    }

    #[test]
    fn test_combo_matches_short_option_case_insensitively() {
        let mut widget = Widget::new("combo", presets_combo(false));
        update_widget(&mut widget, &json!("B"));
        assert_eq!(combo_active(&widget), Some(1));
        assert_eq!(widget_value(&widget), Some(json!("b")));
    }

    #[test]
    fn test_combo_falls_back_to_numeric_match() {
        let mut widget = Widget::new("combo", presets_combo(false));
        update_widget(&mut widget, &json!("7"));
        assert_eq!(combo_active(&widget), Some(1));

        update_widget(&mut widget, &json!(9.5));
        assert_eq!(combo_active(&widget), Some(2));

        // Truncated numeric cell matches the integer projection
        update_widget(&mut widget, &json!(9));
        assert_eq!(combo_active(&widget), Some(2));
    }

    #[test]
    fn test_combo_unmatched_selects_first_row() {
        let mut widget = Widget::new("combo", presets_combo(false));
        update_widget(&mut widget, &json!("c"));
        update_widget(&mut widget, &json!("nothing like it"));
        assert_eq!(combo_active(&widget), Some(0));
        assert_eq!(widget_value(&widget), Some(json!("a")));
    }

    #[test]
    fn test_combo_unmatched_goes_to_entry_when_editable() {
        let mut widget = Widget::new("combo", presets_combo(true));
        update_widget(&mut widget, &json!("b"));
        assert_eq!(combo_active(&widget), Some(1));

        update_widget(&mut widget, &json!("film"));
        assert_eq!(combo_active(&widget), None);
        assert_eq!(widget_value(&widget), Some(json!("film")));
    }

    #[test]
    fn test_combo_without_selection_reads_empty() {
        let widget = Widget::new("combo", presets_combo(false));
        assert_eq!(widget_value(&widget), Some(json!("")));

        let mut widget = Widget::new("combo", WidgetState::ComboBox(ComboBoxState::new(Vec::new())));
        update_widget(&mut widget, &json!("x"));
        assert_eq!(combo_active(&widget), None);
        assert_eq!(widget_value(&widget), Some(json!("")));
    }

    #[test]
    fn test_spin_value_is_clamped() {
        let mut widget = Widget::new("q", WidgetState::SpinButton(RangeState::new(0.0, 0.0, 51.0)));
        update_widget(&mut widget, &json!("80"));
        assert_eq!(widget_double(&widget), 51.0);
    }

    #[test]
    fn test_label_write_strips_markup() {
        let mut widget = Widget::new("source_info", WidgetState::Label(LabelState::default()));
        update_widget(&mut widget, &json!("<b>Title 1</b> &amp; more"));
        assert_eq!(widget_string(&widget), "Title 1 & more");
    }

    #[test]
    fn test_change_notification() {
        let mut entry = Widget::new("dest", WidgetState::Entry(EntryState::default()));
        update_widget(&mut entry, &json!("out.mkv"));
        assert!(entry.take_pending_change());
        update_widget(&mut entry, &json!("out.mkv"));
        assert!(!entry.has_pending_change());

        let mut text = Widget::new("notes", WidgetState::TextView(TextViewState::default()));
        update_widget(&mut text, &json!("changed text"));
        assert!(!text.has_pending_change());
        assert_eq!(widget_string(&text), "changed text");
    }

    #[test]
    fn test_file_chooser_open_existing_directory() {
        let dir = temp_dir();
        let mut widget = Widget::new(
            "source",
            WidgetState::FileChooserButton(FileChooserState::new(ChooserAction::Open)),
        );
        update_widget(&mut widget, &json!(dir.to_string_lossy()));
        assert_eq!(chooser(&widget).current_folder.as_deref(), Some(dir.as_path()));
        assert_eq!(chooser(&widget).filename, None);
        assert_eq!(widget_string(&widget), dir.to_string_lossy());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_chooser_open_existing_file() {
        let dir = temp_dir();
        let file = dir.join("movie.mkv");
        std::fs::write(&file, b"").unwrap();
        let mut widget = Widget::new(
            "source",
            WidgetState::FileChooserButton(FileChooserState::new(ChooserAction::Open)),
        );
        update_widget(&mut widget, &json!(file.to_string_lossy()));
        assert_eq!(chooser(&widget).filename.as_deref(), Some(file.as_path()));
        assert_eq!(widget_string(&widget), file.to_string_lossy());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_chooser_open_missing_path_uses_parent() {
        let dir = temp_dir();
        let missing = dir.join("not-there").join("movie.mkv");
        let mut widget = Widget::new(
            "source",
            WidgetState::FileChooserButton(FileChooserState::new(ChooserAction::Open)),
        );
        update_widget(&mut widget, &json!(missing.to_string_lossy()));
        assert_eq!(
            chooser(&widget).current_folder.as_deref(),
            Some(dir.join("not-there").as_path())
        );
        assert_eq!(chooser(&widget).filename, None);

        update_widget(&mut widget, &json!("relative.mkv"));
        assert_eq!(chooser(&widget).current_folder.as_deref(), Some(Path::new(".")));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_chooser_save_and_folder_take_path() {
        let mut save = Widget::new(
            "dest",
            WidgetState::FileChooserButton(FileChooserState::new(ChooserAction::Save)),
        );
        update_widget(&mut save, &json!("/no/such/dir/out.mp4"));
        assert_eq!(widget_string(&save), "/no/such/dir/out.mp4");

        let mut folder = Widget::new(
            "dest_dir",
            WidgetState::FileChooserButton(FileChooserState::new(ChooserAction::SelectFolder)),
        );
        update_widget(&mut folder, &json!("/no/such/dir"));
        assert_eq!(widget_string(&folder), "/no/such/dir");

        update_widget(&mut folder, &json!(""));
        assert_eq!(widget_string(&folder), "/no/such/dir");
    }

    #[test]
    fn test_widget_to_setting_uses_setting_key() {
        let mut settings = Settings::new();
        let widget = Widget::new("VideoFramerate", WidgetState::Entry(EntryState { text: "auto".into() }));
        widget_to_setting(&mut settings, &widget);
        assert_eq!(settings.get("VideoFramerate"), Some(&json!("auto")));

        let anonymous = Widget::new("GtkEntry3", WidgetState::Entry(EntryState::default()));
        widget_to_setting(&mut settings, &anonymous);
        assert_eq!(settings.len(), 1);
    }
}
