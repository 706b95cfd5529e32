use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub analysis: AnalysisConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    pub foursquare: ProviderEntry,
    pub tomtom: ProviderEntry,
    pub yelp: ProviderEntry,
    pub search_timeout_seconds: u64,
    pub default_radius_m: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEntry {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub daily_limit: u32,
}

impl ProviderEntry {
    /// Credential resolution order: config value, then environment.
    pub fn resolved_key(&self, env_var: &str) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(env_var).ok().filter(|k| !k.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    pub fetch_timeout_seconds: u64,
    pub probe_timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: ProvidersConfig {
                foursquare: ProviderEntry {
                    api_key: None,
                    enabled: true,
                    daily_limit: 95_000,
                },
                tomtom: ProviderEntry {
                    api_key: None,
                    enabled: true,
                    daily_limit: 2_500,
                },
                yelp: ProviderEntry {
                    api_key: None,
                    enabled: true,
                    daily_limit: 500,
                },
                search_timeout_seconds: 30,
                default_radius_m: 5_000,
            },
            analysis: AnalysisConfig {
                fetch_timeout_seconds: 10,
                probe_timeout_seconds: 5,
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                    .to_string(),
            },
            storage: StorageConfig {
                db_path: "data/businesses.db".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

pub async fn load_config(
    path: &str,
) -> std::result::Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}
