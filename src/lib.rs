pub mod client;
pub mod config;
pub mod domain;
pub mod engine;
pub mod infrastructure;
