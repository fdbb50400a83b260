pub mod cli;
pub mod config;
pub mod diff;
pub mod fetcher;
pub mod models;
pub mod notifier;
pub mod runner;
pub mod sitelog;
pub mod sites;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use models::{Product, RunResult, SeenSet};
pub use runner::Runner;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
