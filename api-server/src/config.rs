//! Configuration module

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use finance_ai_core::ModelConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Where model artifacts are loaded from / written to
    pub models_dir: PathBuf,

    /// CORS origins (`*` allows any)
    pub allowed_origins: Vec<String>,

    pub project_name: String,

    pub version: String,

    /// Environment (development, production)
    pub environment: String,

    /// Retrain on startup even when artifacts exist
    pub train_on_startup: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            models_dir: env::var("MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models")),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_else(|_| vec!["http://localhost:3000".to_string()]),

            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "Finance AI API".to_string()),

            version: env::var("VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            train_on_startup: env::var("TRAIN_ON_STARTUP")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Engine settings from `FINANCE_AI_*`, with this server's models dir
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::from_env().with_models_dir(&self.models_dir)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            models_dir: PathBuf::from("models"),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            project_name: "Finance AI API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            train_on_startup: false,
        }
    }
}

/// Comma-separated list or JSON array (`["http://a", "http://b"]`)
fn parse_origins(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list;
        }
    }
    trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("http://a, http://b"), vec!["http://a", "http://b"]);
        assert_eq!(parse_origins(r#"["http://a","http://b"]"#), vec!["http://a", "http://b"]);
        assert!(parse_origins(" , ").is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config { host: "0.0.0.0".to_string(), port: 9000, ..Default::default() };
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
        assert!(!config.is_production());
    }
}
