pub mod reddit;
pub mod twitter;
