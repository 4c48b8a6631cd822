pub mod config;
pub mod files;
pub mod logging;
pub mod midi;
