
pub mod apply_setup;
pub mod apply_panel;
pub mod apply_release;
pub mod history;
