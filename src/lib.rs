pub mod analyzers;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod ingest;
pub mod output;
pub mod parser;
pub mod stats;
