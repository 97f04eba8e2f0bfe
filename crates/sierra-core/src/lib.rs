pub mod app_config;
pub mod cache;
mod config;
pub mod records;

use thiserror::Error;

pub use app_config::{AppConfig, FetchStrategy};
pub use cache::{CacheEntry, Clock, SystemClock, TtlCache};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{InventorySummary, NormalizedProduct, ProductFlags, ProductSource};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
