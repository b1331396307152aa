use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    /// Chat-completions backend used for investment plans.
    pub openai: LlmConfig,

    /// Chat-completions backend used for meal plans and the search bar.
    pub openrouter: LlmConfig,

    pub search: SearchConfig,

    pub alpha_vantage: AlphaVantageConfig,

    pub alpaca: AlpacaConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// `sqlite:` or `postgres://` connection string
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/investai.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Timeout applied to every outbound HTTP request.
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// PEM encoded RS256 public key of the identity provider.
    pub jwt_public_key_pem: Option<String>,

    /// HS256 secret. Only meant for local development and tests.
    pub jwt_shared_secret: Option<String>,

    /// Base URL of the identity provider backend API.
    pub identity_api_url: String,

    /// Secret key for the identity provider backend API.
    #[serde(skip_serializing)]
    pub identity_secret_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,

    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub model: String,

    pub temperature: f32,

    pub max_tokens: u32,
}

impl LlmConfig {
    #[must_use]
    pub fn openai() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 1500,
        }
    }

    #[must_use]
    pub fn openrouter() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: None,
            model: "meta-llama/llama-3.2-3b-instruct:free".to_string(),
            temperature: 0.7,
            max_tokens: 1500,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::openai()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound for the search-bar completion call.
    pub llm_timeout_seconds: u64,

    pub history_default_limit: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            llm_timeout_seconds: 20,
            history_default_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaVantageConfig {
    pub base_url: String,

    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.alphavantage.co".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlpacaConfig {
    pub trading_base_url: String,

    pub data_base_url: String,

    pub news_ws_url: String,

    #[serde(skip_serializing)]
    pub key_id: Option<String>,

    #[serde(skip_serializing)]
    pub secret_key: Option<String>,

    /// How long a realtime news request waits for articles.
    pub stream_timeout_seconds: u64,
}

impl Default for AlpacaConfig {
    fn default() -> Self {
        Self {
            trading_base_url: "https://paper-api.alpaca.markets".to_string(),
            data_base_url: "https://data.alpaca.markets".to_string(),
            news_ws_url: "wss://stream.data.alpaca.markets/v1beta1/news".to_string(),
            key_id: None,
            secret_key: None,
            stream_timeout_seconds: 15,
        }
    }
}

impl AlpacaConfig {
    /// Returns both halves of the key pair, or `None` if either is blank.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.key_id.as_deref().filter(|s| !s.is_empty())?;
        let secret = self.secret_key.as_deref().filter(|s| !s.is_empty())?;
        Some((key, secret))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig {
                identity_api_url: "https://api.clerk.com/v1".to_string(),
                ..AuthConfig::default()
            },
            openai: LlmConfig::openai(),
            openrouter: LlmConfig::openrouter(),
            search: SearchConfig::default(),
            alpha_vantage: AlphaVantageConfig::default(),
            alpaca: AlpacaConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads the first config file found (or defaults), then applies
    /// environment overrides. A `.env` file in the working directory is
    /// honoured.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    /// Overrides values with the environment variables the web app has
    /// always been deployed with. Non-empty values win over the file.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DATABASE_URL") {
            self.general.database_url = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = get("OPEN_ROUTER_API_KEY") {
            self.openrouter.api_key = Some(v);
        }
        if let Some(v) = get("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage.api_key = Some(v);
        }
        if let Some(v) = get("APCA_API_KEY_ID").or_else(|| get("APCA_KEY_ID")) {
            self.alpaca.key_id = Some(v);
        }
        if let Some(v) = get("APCA_API_KEY_SECRET").or_else(|| get("APCA_KEY_SECRET")) {
            self.alpaca.secret_key = Some(v);
        }
        if let Some(v) = get("APCA_TRADE_API_BASE_URL") {
            self.alpaca.trading_base_url = v;
        }
        if let Some(v) = get("ALPACA_NEWS_WS_URL") {
            self.alpaca.news_ws_url = v;
        }
        if let Some(v) = get("CLERK_SECRET_KEY") {
            self.auth.identity_secret_key = Some(v);
        }
        if let Some(v) = get("CLERK_JWT_KEY") {
            self.auth.jwt_public_key_pem = Some(v);
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("investai").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".investai").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.trim().is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.search.llm_timeout_seconds == 0 {
            anyhow::bail!("Search LLM timeout must be > 0");
        }

        if !(1..=100).contains(&self.search.history_default_limit) {
            anyhow::bail!("Search history default limit must be between 1 and 100");
        }

        if self.alpaca.stream_timeout_seconds == 0 {
            anyhow::bail!("Alpaca stream timeout must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.openrouter.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.openrouter.max_tokens, 1500);
        assert_eq!(config.alpaca.trading_base_url, "https://paper-api.alpaca.markets");
        assert!(config.alpaca.credentials().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_hides_secrets() {
        let mut config = Config::default();
        config.openai.api_key = Some("sk-secret".to_string());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[alpaca]"));
        assert!(!toml_str.contains("sk-secret"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [search]
            llm_timeout_seconds = 5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.search.llm_timeout_seconds, 5);
        assert_eq!(config.server.port, 3001);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-openai"),
            ("APCA_KEY_ID", "legacy-id"),
            ("APCA_API_KEY_SECRET", "secret"),
            ("ALPHA_VANTAGE_API_KEY", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(ToString::to_string));

        assert_eq!(config.openai.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.alpaca.credentials(), Some(("legacy-id", "secret")));
        assert!(config.alpha_vantage.api_key.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.search.llm_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.alpaca.stream_timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("stream timeout"));
    }
}
