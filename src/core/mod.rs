pub mod config;

pub use config::HarvestConfig;
