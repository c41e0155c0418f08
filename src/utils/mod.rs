/// Logging setup
pub mod logger;
