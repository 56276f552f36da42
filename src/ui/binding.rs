//! Binding orchestration between the widget registry and settings trees
//!
//! Every update pushes a value into a widget and immediately reads the
//! widget back into the target tree. The tree therefore always holds what
//! the widget actually shows, even when the widget could not represent the
//! pushed value exactly (a combo box falling back to its first row, a spin
//! button clamping to its range).

use log::debug;
use serde_json::Value;
use thiserror::Error;

use transcode_settings_types::{ComboRow, Settings, WidgetState};

use super::marshal::{combo_row_index, update_widget, widget_to_setting, Projection};
use super::registry::WidgetRegistry;

/// Binding failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("no widget found for key '{0}'")]
    WidgetNotFound(String),
}

impl BindingError {
    /// Integer status for this error
    pub fn status(&self) -> i32 {
        match self {
            BindingError::WidgetNotFound(_) => -1,
        }
    }
}

/// Integer status of a binding result: 0 on success, negative on failure
pub fn status_code(result: &Result<(), BindingError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.status(),
    }
}

/// The UI session: its widgets and the settings tree they edit
#[derive(Debug, Default)]
pub struct UiContext {
    pub widgets: WidgetRegistry,
    pub settings: Settings,
}

impl UiContext {
    pub fn new(widgets: WidgetRegistry) -> Self {
        Self {
            widgets,
            settings: Settings::new(),
        }
    }

    pub fn with_settings(widgets: WidgetRegistry, settings: Settings) -> Self {
        Self { widgets, settings }
    }

    /// Show `value` in the widget called `name` and store the result in the
    /// session settings.
    pub fn ui_update(&mut self, name: Option<&str>, value: Option<&Value>) -> Result<(), BindingError> {
        debug!("ui_update() {:?}", name);
        let (Some(name), Some(value)) = (name, value) else {
            return Ok(());
        };
        push_and_store(&mut self.widgets, &mut self.settings, name, value)
    }

    /// Like [`ui_update`](Self::ui_update), but stores the result in `target`
    /// instead of the session settings.
    pub fn ui_settings_update(
        &mut self,
        target: &mut Settings,
        name: Option<&str>,
        value: Option<&Value>,
    ) -> Result<(), BindingError> {
        debug!("ui_settings_update() {:?}", name);
        let (Some(name), Some(value)) = (name, value) else {
            return Ok(());
        };
        push_and_store(&mut self.widgets, target, name, value)
    }

    /// Show the value stored under `name` in `source` and store the result in
    /// the session settings. A key missing from `source` is not an error.
    pub fn ui_update_from_settings(
        &mut self,
        name: Option<&str>,
        source: &Settings,
    ) -> Result<(), BindingError> {
        debug!("ui_update_from_settings() {:?}", name);
        let Some(name) = name else {
            return Ok(());
        };
        let Some(value) = source.get(name) else {
            return Ok(());
        };
        push_and_store(&mut self.widgets, &mut self.settings, name, value)
    }

    /// Re-show the session's own value for `name`
    pub fn refresh_from_settings(&mut self, name: &str) -> Result<(), BindingError> {
        let Some(value) = self.settings.get(name).cloned() else {
            return Ok(());
        };
        push_and_store(&mut self.widgets, &mut self.settings, name, &value)
    }

    /// Show every scalar value of `source` in its widget.
    ///
    /// Dictionaries and lists (sections such as "Job") are skipped. Returns
    /// an error for each remaining key that has no widget.
    pub fn update_all_from_settings(&mut self, source: &Settings) -> Vec<BindingError> {
        let mut failures = Vec::new();
        for (key, value) in source {
            if value.is_object() || value.is_array() {
                continue;
            }
            if let Err(e) = self.ui_update_from_settings(Some(key.as_str()), source) {
                failures.push(e);
            }
        }
        failures
    }

    /// Store every widget with a pending change in the session settings.
    ///
    /// This is the event-loop half of the binding. Returns how many widgets
    /// were stored.
    pub fn flush_changes(&mut self) -> usize {
        let mut stored = 0;
        for widget in self.widgets.iter_mut() {
            if widget.take_pending_change() {
                widget_to_setting(&mut self.settings, widget);
                stored += 1;
            }
        }
        stored
    }

    /// Read every widget into the session settings
    pub fn read_all(&mut self) {
        for widget in self.widgets.iter() {
            widget_to_setting(&mut self.settings, widget);
        }
    }

    /// Numeric form of the combo option stored under `key` in `settings`
    pub fn settings_combo_int(&self, settings: &Settings, key: &str) -> Option<i64> {
        self.settings_combo_row(settings, key).map(|row| row.numeric as i64)
    }

    pub fn settings_combo_double(&self, settings: &Settings, key: &str) -> Option<f64> {
        self.settings_combo_row(settings, key).map(|row| row.numeric)
    }

    /// Display label of the combo option stored under `key` in `settings`
    pub fn settings_combo_option(&self, settings: &Settings, key: &str) -> Option<String> {
        self.settings_combo_row(settings, key).map(|row| row.label.clone())
    }

    /// Row of the combo registered under `key` that the stored value selects.
    ///
    /// `None` when there is no such combo, no stored value, or no matching row.
    fn settings_combo_row(&self, settings: &Settings, key: &str) -> Option<&ComboRow> {
        let WidgetState::ComboBox(combo) = &self.widgets.get(key)?.state else {
            debug!("{} is not a combo box", key);
            return None;
        };
        let value = Projection::of(settings.get(key)?)?;
        combo_row_index(combo, &value).map(|i| &combo.rows[i])
    }
}

fn push_and_store(
    widgets: &mut WidgetRegistry,
    target: &mut Settings,
    name: &str,
    value: &Value,
) -> Result<(), BindingError> {
    let Some(widget) = widgets.get_mut(name) else {
        debug!("Failed to find widget for key: {}", name);
        return Err(BindingError::WidgetNotFound(name.to_string()));
    };
    update_widget(widget, value);
    let is_radio = matches!(widget.state, WidgetState::RadioButton(_));

    // The value may not have changed, and settings only follow changes,
    // so store the widget's value here as well.
    widget_to_setting(target, widget);

    if is_radio {
        widgets.sync_radio_group(name);
    }
    Ok(())
}
