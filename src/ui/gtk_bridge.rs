//! Mirror the widget model onto live GTK4 widgets
//!
//! `snapshot` copies a GTK widget's display state into a fresh model state;
//! `refresh` does the same into an existing state, keeping what the GTK
//! widget cannot report (combo rows, radio groups). `apply` pushes a model
//! state back into the GTK widget.
//!
//! Combo boxes map onto `DropDown` over a `StringList` of row labels. File
//! choosers map onto the `FileChooser` interface.

// GtkFileChooser is deprecated since GTK 4.10 but still the interface the
// chooser widgets implement.
#![allow(deprecated)]

use gtk4::gio;
use gtk4::prelude::*;
use gtk4::{
    Builder, CheckButton, DropDown, Entry, FileChooser, Label, Scale, ScaleButton, SpinButton,
    StringList, TextView, ToggleButton,
};

use transcode_settings_types::{
    ChooserAction, ComboBoxState, ComboRow, EntryState, FileChooserState, LabelState, RadioState,
    RangeState, ScaleState, TextViewState, ToggleState, Widget, WidgetState,
};

use super::registry::WidgetRegistry;

/// Copy a GTK widget's display state into the model
pub fn snapshot(widget: &gtk4::Widget) -> WidgetState {
    if let Some(entry) = widget.downcast_ref::<Entry>() {
        return WidgetState::Entry(EntryState {
            text: entry.text().to_string(),
        });
    }
    if let Some(check) = widget.downcast_ref::<CheckButton>() {
        // GTK4 has no getter for a check button's group; a registry entry
        // declared as a radio button keeps its group through `refresh`
        return WidgetState::CheckButton(ToggleState {
            active: check.is_active(),
        });
    }
    if let Some(toggle) = widget.downcast_ref::<ToggleButton>() {
        return WidgetState::ToggleButton(ToggleState {
            active: toggle.is_active(),
        });
    }
    if let Some(dropdown) = widget.downcast_ref::<DropDown>() {
        // Without a declared option list, each label is its own option and
        // its position the numeric form
        let rows = dropdown_labels(dropdown)
            .iter()
            .enumerate()
            .map(|(i, label)| ComboRow::new(label, label, i as f64))
            .collect();
        let mut combo = ComboBoxState::new(rows);
        combo.active = selected_row(dropdown);
        return WidgetState::ComboBox(combo);
    }
    if let Some(spin) = widget.downcast_ref::<SpinButton>() {
        let adj = spin.adjustment();
        return WidgetState::SpinButton(RangeState::new(spin.value(), adj.lower(), adj.upper()));
    }
    if let Some(scale) = widget.downcast_ref::<Scale>() {
        let adj = scale.adjustment();
        return WidgetState::Scale(ScaleState::new(
            scale.value(),
            adj.lower(),
            adj.upper(),
            scale.digits().max(0) as u32,
        ));
    }
    if let Some(button) = widget.downcast_ref::<ScaleButton>() {
        let adj = button.adjustment();
        return WidgetState::ScaleButton(RangeState::new(button.value(), adj.lower(), adj.upper()));
    }
    if let Some(view) = widget.downcast_ref::<TextView>() {
        let buffer = view.buffer();
        let (start, end) = buffer.bounds();
        return WidgetState::TextView(TextViewState {
            text: buffer.text(&start, &end, false).to_string(),
        });
    }
    if let Some(label) = widget.downcast_ref::<Label>() {
        return WidgetState::Label(LabelState {
            text: label.text().to_string(),
        });
    }
    if let Some(chooser) = widget.dynamic_cast_ref::<FileChooser>() {
        return WidgetState::FileChooserButton(FileChooserState {
            action: ChooserAction::from(chooser.action()),
            filename: chooser.file().and_then(|f| f.path()),
            current_folder: chooser.current_folder().and_then(|f| f.path()),
        });
    }
    WidgetState::Unsupported {
        type_name: widget.type_().name().to_string(),
    }
}

/// Update a model state from its GTK widget.
///
/// Radio buttons keep their group and combo boxes keep their declared rows;
/// every other kind is replaced by a fresh snapshot.
pub fn refresh(state: &mut WidgetState, widget: &gtk4::Widget) {
    match state {
        WidgetState::RadioButton(radio) => {
            if let Some(check) = widget.downcast_ref::<CheckButton>() {
                radio.active = check.is_active();
                radio.inconsistent = check.is_inconsistent();
            }
        }
        WidgetState::ComboBox(combo) => {
            if let Some(dropdown) = widget.downcast_ref::<DropDown>() {
                combo.active = selected_row(dropdown).filter(|&i| i < combo.rows.len());
            }
        }
        _ => *state = snapshot(widget),
    }
}

/// Push a model state into a GTK widget of the matching kind
pub fn apply(state: &WidgetState, widget: &gtk4::Widget) {
    match state {
        WidgetState::Entry(s) => {
            if let Some(entry) = widget.downcast_ref::<Entry>() {
                if entry.text().as_str() != s.text {
                    entry.set_text(&s.text);
                }
            }
        }
        WidgetState::RadioButton(RadioState {
            active,
            inconsistent,
            ..
        }) => {
            if let Some(check) = widget.downcast_ref::<CheckButton>() {
                check.set_active(*active);
                check.set_inconsistent(*inconsistent);
            }
        }
        WidgetState::CheckButton(ToggleState { active }) => {
            if let Some(check) = widget.downcast_ref::<CheckButton>() {
                check.set_active(*active);
            }
        }
        WidgetState::ToggleButton(ToggleState { active }) => {
            if let Some(toggle) = widget.downcast_ref::<ToggleButton>() {
                toggle.set_active(*active);
            }
        }
        WidgetState::ComboBox(combo) => {
            if let Some(dropdown) = widget.downcast_ref::<DropDown>() {
                apply_combo(combo, dropdown);
            }
        }
        WidgetState::SpinButton(s) => {
            if let Some(spin) = widget.downcast_ref::<SpinButton>() {
                spin.set_value(s.value);
            }
        }
        WidgetState::Scale(s) => {
            if let Some(scale) = widget.downcast_ref::<Scale>() {
                scale.set_value(s.value);
            }
        }
        WidgetState::ScaleButton(s) => {
            if let Some(button) = widget.downcast_ref::<ScaleButton>() {
                button.set_value(s.value);
            }
        }
        WidgetState::TextView(s) => {
            if let Some(view) = widget.downcast_ref::<TextView>() {
                view.buffer().set_text(&s.text);
            }
        }
        WidgetState::Label(s) => {
            if let Some(label) = widget.downcast_ref::<Label>() {
                label.set_text(&s.text);
            }
        }
        WidgetState::FileChooserButton(s) => {
            if let Some(chooser) = widget.dynamic_cast_ref::<FileChooser>() {
                apply_file_chooser(s, chooser);
            }
        }
        _ => log::debug!("No GTK4 counterpart for {}", state.type_name()),
    }
}

/// Show the combo's rows and selection in a drop-down.
///
/// The drop-down's model is replaced when its labels differ from the rows.
fn apply_combo(combo: &ComboBoxState, dropdown: &DropDown) {
    let labels: Vec<&str> = combo.rows.iter().map(|row| row.label.as_str()).collect();
    if dropdown_labels(dropdown) != labels {
        dropdown.set_model(Some(&StringList::new(&labels)));
    }
    let position = combo
        .active
        .map(|i| i as u32)
        .unwrap_or(gtk4::INVALID_LIST_POSITION);
    if dropdown.selected() != position {
        dropdown.set_selected(position);
    }
}

fn apply_file_chooser(state: &FileChooserState, chooser: &FileChooser) {
    let result = match (&state.filename, &state.current_folder) {
        (Some(path), _) => chooser.set_file(&gio::File::for_path(path)),
        (None, Some(folder)) => chooser.set_current_folder(Some(&gio::File::for_path(folder))),
        (None, None) => Ok(()),
    };
    if let Err(e) = result {
        log::warn!("Failed to update file chooser: {}", e);
    }
}

fn dropdown_labels(dropdown: &DropDown) -> Vec<String> {
    dropdown
        .model()
        .and_downcast::<StringList>()
        .map(|list| {
            (0..list.n_items())
                .filter_map(|i| list.string(i))
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn selected_row(dropdown: &DropDown) -> Option<usize> {
    let selected = dropdown.selected();
    (selected != gtk4::INVALID_LIST_POSITION).then_some(selected as usize)
}

/// Snapshot every named widget of a builder into a registry
pub fn registry_from_builder(builder: &Builder) -> WidgetRegistry {
    let mut registry = WidgetRegistry::new();
    for object in builder.objects() {
        let Some(widget) = object.downcast_ref::<gtk4::Widget>() else {
            continue;
        };
        let mut entry = Widget::new("", snapshot(widget));
        entry.buildable_name = widget.buildable_id().map(|id| id.to_string());
        entry.name = Some(widget.widget_name().to_string()).filter(|n| !n.is_empty());
        registry.insert(entry);
    }
    registry
}

/// Refresh every registry widget from the builder's widget of the same id
pub fn refresh_from_builder(registry: &mut WidgetRegistry, builder: &Builder) {
    for widget in registry.iter_mut() {
        let Some(id) = widget.buildable_name.as_deref() else {
            continue;
        };
        if let Some(source) = builder.object::<gtk4::Widget>(id) {
            refresh(&mut widget.state, &source);
        }
    }
}

/// Push every registry widget back into the builder's widgets
pub fn apply_to_builder(registry: &WidgetRegistry, builder: &Builder) {
    for widget in registry.iter() {
        let Some(id) = widget.buildable_name.as_deref() else {
            continue;
        };
        if let Some(target) = builder.object::<gtk4::Widget>(id) {
            apply(&widget.state, &target);
        }
    }
}
