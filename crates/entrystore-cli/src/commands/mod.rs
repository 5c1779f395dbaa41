pub mod config;
pub mod consume;
pub mod entry;
pub mod list;
