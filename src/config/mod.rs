pub mod settings;

pub use settings::{log_level_from, Config};

use crate::error::SentinelError;
use std::sync::Arc;

/// Loads `.env` (if present) and reads the configuration through `lookup`, which
/// lets the binary layer command-line overrides on top of the environment.
pub fn load_config_with<F>(lookup: F) -> Result<Arc<Config>, SentinelError>
where
    F: Fn(&str) -> Option<String>,
{
    dotenv::dotenv().ok(); // Load .env file if present, ignore errors

    let config = Config::from_vars(lookup)?;
    config.validate_and_log();

    Ok(Arc::new(config))
}
