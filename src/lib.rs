pub mod commands;
pub mod config;
pub mod extraction;
pub mod ingestion;
pub mod models;
pub mod ocr;
pub mod services;
pub mod utils;

pub use config::Config;
