use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the per-asset CSV files.
    pub data_dir: PathBuf,
    /// Path to the history store database.
    pub db_path: PathBuf,
    /// How long a loaded series stays valid in the cache.
    pub cache_ttl: Duration,
    /// Default number of simulated paths.
    pub sim_paths: usize,
    /// Default forecast horizon in days.
    pub sim_days: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let data_dir = std::env::var("RISKDESK_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let db_path = std::env::var("RISKDESK_DB_PATH")
            .unwrap_or_else(|_| "./riskdesk.db".to_string())
            .into();

        let cache_ttl_secs = std::env::var("RISKDESK_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .unwrap_or(600);

        let sim_paths = std::env::var("RISKDESK_SIM_PATHS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .unwrap_or(1000);

        let sim_days = std::env::var("RISKDESK_SIM_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(Self {
            data_dir,
            db_path,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            sim_paths,
            sim_days,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "./data".into(),
            db_path: "./riskdesk.db".into(),
            cache_ttl: Duration::from_secs(600),
            sim_paths: 1000,
            sim_days: 30,
        }
    }
}
