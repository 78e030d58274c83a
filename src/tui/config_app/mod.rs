pub mod app;
pub mod fields;
pub mod ui;
