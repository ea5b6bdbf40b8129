pub mod build_info;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod query;
pub mod store;
