pub mod config;
pub mod devices;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod state;
