pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod logging;
pub mod notify;
