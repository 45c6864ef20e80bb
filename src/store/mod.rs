pub mod script_io;
pub mod settings_store;
