pub mod analyze;
pub mod config;
pub mod export;
pub mod info;
pub mod plot;
