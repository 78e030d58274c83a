pub mod common;
pub mod config_app;
pub mod dashboard_app;
pub mod data;
pub mod event_app;
pub mod log_app;
pub mod shared_ui;
pub mod stream;
pub mod style;
pub mod table_ui;
pub mod ui_loop;

#[cfg(test)]
pub(crate) mod test_support;

pub use ui_loop::run;
