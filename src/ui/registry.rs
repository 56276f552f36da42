//! Registry of bindable widgets, looked up by setting key

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

use transcode_settings_types::{Widget, WidgetState};

/// Widgets of a window, addressable by name
///
/// Plays the role of the UI builder: orchestration resolves widgets by the
/// same name that keys their setting, so a widget with a generated builder
/// id is found under its widget name.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: Vec<Widget>,
    index: HashMap<String, usize>,
}

impl WidgetRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of widgets
    pub fn from_widgets(widgets: impl IntoIterator<Item = Widget>) -> Self {
        let mut registry = Self::new();
        for widget in widgets {
            registry.insert(widget);
        }
        registry
    }

    /// Load a layout file (a JSON list of widgets)
    pub fn load_layout(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout {}", path.display()))?;
        Self::from_layout_json(&content)
            .with_context(|| format!("Invalid layout {}", path.display()))
    }

    /// Parse a layout from JSON text
    pub fn from_layout_json(json: &str) -> Result<Self> {
        let widgets: Vec<Widget> = serde_json::from_str(json)?;
        Ok(Self::from_widgets(widgets))
    }

    /// Add a widget. A widget with the same key replaces the earlier one.
    pub fn insert(&mut self, widget: Widget) {
        let Some(key) = widget.setting_key().map(str::to_string) else {
            warn!("Skipping widget without a name ({})", widget.state.type_name());
            return;
        };
        if let Some(&i) = self.index.get(&key) {
            debug!("Replacing widget {}", key);
            self.widgets[i] = widget;
        } else {
            self.index.insert(key, self.widgets.len());
            self.widgets.push(widget);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Widget> {
        self.index.get(name).map(|&i| &self.widgets[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Widget> {
        self.index.get(name).map(|&i| &mut self.widgets[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Widgets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Widget> {
        self.widgets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Deactivate the other members of an active radio button's group.
    ///
    /// Does nothing unless `name` is an active radio button with a group.
    pub fn sync_radio_group(&mut self, name: &str) {
        let group = match self.get(name).map(|w| &w.state) {
            Some(WidgetState::RadioButton(radio)) if radio.active => match &radio.group {
                Some(group) => group.clone(),
                None => return,
            },
            _ => return,
        };

        for widget in &mut self.widgets {
            if widget.setting_key() == Some(name) {
                continue;
            }
            if let WidgetState::RadioButton(radio) = &mut widget.state {
                if radio.active && radio.group.as_deref() == Some(group.as_str()) {
                    radio.active = false;
                    widget.mark_changed();
                }
            }
        }
    }
}
