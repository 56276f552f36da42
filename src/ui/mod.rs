//! Widget binding layer: marshaling, widget lookup and orchestration

pub mod binding;
#[cfg(feature = "gtk")]
pub mod gtk_bridge;
pub mod markup;
pub mod marshal;
pub mod registry;

pub use binding::{status_code, BindingError, UiContext};
pub use marshal::{
    combo_row_index, update_widget, widget_bool, widget_double, widget_int, widget_string, widget_to_setting,
    widget_value, Marshal, Projection,
};
pub use registry::WidgetRegistry;
