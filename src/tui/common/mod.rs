pub mod base_table_state;
pub mod key_handler;
pub mod stream_factory;
pub mod text_input;
