pub mod chunks;
pub mod config;
pub mod generate;
