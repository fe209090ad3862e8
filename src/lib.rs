pub mod config;
pub mod flag;
pub mod logging;
pub mod options;
pub mod pretty;
