pub mod api;
pub mod cache_manager;
pub mod error;
pub mod settings;
pub mod sync;
pub mod tui;
