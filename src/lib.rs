pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod render;
pub mod report;
pub mod upload;
pub mod views;
