pub mod ciks;
pub mod core;
pub mod edgar;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-exports
pub use ciks::Cik;
pub use crate::core::config::HarvestConfig;
pub use pipeline::{Pipeline, RunOptions};
pub use report::RunReport;
