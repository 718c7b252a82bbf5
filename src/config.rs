//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub kamiwaza: KamiwazaConfig,
    pub exa: ExaConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 3000)
    pub port: u16,
    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,
    /// Timeout applied to every upstream HTTP call
    pub upstream_timeout_seconds: u64,
}

/// Deployment environment selector
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Kamiwaza identity and model catalog API
#[derive(Debug, Clone, Deserialize)]
pub struct KamiwazaConfig {
    /// Base URI, e.g. "https://kamiwaza.example.com/api"
    pub uri: String,
}

/// Exa content-search API
#[derive(Debug, Clone, Deserialize)]
pub struct ExaConfig {
    pub api_key: String,
    /// Defaults to "https://api.exa.ai"
    pub base_url: String,
    /// Number of similar results requested per search
    pub num_results: u32,
    /// Prompt used for the per-result summary
    pub summary_query: String,
}

/// Session gate configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Path of the login page
    pub login_path: String,
    /// Where authenticated visitors of the login page are sent
    pub home_path: String,
    /// Path prefixes that bypass the session gate entirely
    pub public_prefixes: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Fallback filter directives used when `RUST_LOG` is unset
    pub fn filter_directives(&self) -> String {
        let level = self.level.trim().to_ascii_lowercase();
        format!("kamiwaza_scout={level},tower_http={level}")
    }

    pub fn is_json(&self) -> bool {
        self.format.trim().eq_ignore_ascii_case("json")
    }
}

pub const DEFAULT_SUMMARY_QUERY: &str = "Explain in one/two lines what does this company do in simple english. Don't use any diffcult words.";

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (SCOUT__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.environment", "development")?
            .set_default("server.upstream_timeout_seconds", 60)?
            .set_default("exa.base_url", "https://api.exa.ai")?
            .set_default("exa.num_results", 6)?
            .set_default("exa.summary_query", DEFAULT_SUMMARY_QUERY)?
            .set_default("auth.login_path", "/login")?
            .set_default("auth.home_path", "/")?
            .set_default(
                "auth.public_prefixes",
                vec!["/static", "/favicon.ico", "/api/auth", "/health"],
            )?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("SCOUT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.public_prefixes")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Session cookies carry `Secure` only in production
    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.environment == Environment::Production
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        let uri = self.kamiwaza.uri.trim();
        if uri.is_empty() {
            return Err(AppError::Config("kamiwaza.uri must be set".to_string()));
        }
        match url::Url::parse(uri) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => {
                return Err(AppError::Config(format!(
                    "kamiwaza.uri must be an absolute http(s) URL, got {uri:?}"
                )));
            }
        }

        if self.exa.api_key.trim().is_empty() {
            return Err(AppError::Config("exa.api_key must be set".to_string()));
        }

        if self.exa.num_results == 0 {
            return Err(AppError::Config(
                "exa.num_results must be greater than 0".to_string(),
            ));
        }

        for (key, path) in [
            ("auth.login_path", &self.auth.login_path),
            ("auth.home_path", &self.auth.home_path),
        ] {
            if !path.starts_with('/') {
                return Err(AppError::Config(format!("{key} must start with '/'")));
            }
        }

        if self
            .auth
            .public_prefixes
            .iter()
            .any(|prefix| prefix.as_str() == "/" || prefix.is_empty())
        {
            return Err(AppError::Config(
                "auth.public_prefixes must not contain the root path".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        if !matches!(
            level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(AppError::Config(format!(
                "logging.level must be one of trace, debug, info, warn, error, got {:?}",
                self.logging.level
            )));
        }

        let format = self.logging.format.trim().to_ascii_lowercase();
        if !matches!(format.as_str(), "pretty" | "json") {
            return Err(AppError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                environment: Environment::Development,
                upstream_timeout_seconds: 60,
            },
            kamiwaza: KamiwazaConfig {
                uri: "https://kamiwaza.example.com/api".to_string(),
            },
            exa: ExaConfig {
                api_key: "exa-key".to_string(),
                base_url: "https://api.exa.ai".to_string(),
                num_results: 6,
                summary_query: DEFAULT_SUMMARY_QUERY.to_string(),
            },
            auth: AuthConfig {
                login_path: "/login".to_string(),
                home_path: "/".to_string(),
                public_prefixes: vec![
                    "/static".to_string(),
                    "/favicon.ico".to_string(),
                    "/api/auth".to_string(),
                    "/health".to_string(),
                ],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_development_config() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert!(!config.should_use_secure_cookies());
    }

    #[test]
    fn production_enables_secure_cookies() {
        let mut config = valid_config();
        config.server.environment = Environment::Production;
        assert!(config.should_use_secure_cookies());
    }

    #[test]
    fn validate_rejects_missing_kamiwaza_uri() {
        let mut config = valid_config();
        config.kamiwaza.uri = "  ".to_string();

        let error = config
            .validate()
            .expect_err("empty kamiwaza uri must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("kamiwaza.uri")
        ));
    }

    #[test]
    fn validate_rejects_relative_kamiwaza_uri() {
        let mut config = valid_config();
        config.kamiwaza.uri = "kamiwaza.local/api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_exa_key() {
        let mut config = valid_config();
        config.exa.api_key = String::new();

        let error = config.validate().expect_err("empty exa key must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("exa.api_key")
        ));
    }

    #[test]
    fn validate_rejects_root_public_prefix() {
        let mut config = valid_config();
        config.auth.public_prefixes.push("/".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn logging_level_drives_filter_directives() {
        let mut config = valid_config();
        assert_eq!(
            config.logging.filter_directives(),
            "kamiwaza_scout=info,tower_http=info"
        );

        config.logging.level = "DEBUG".to_string();
        assert_eq!(
            config.logging.filter_directives(),
            "kamiwaza_scout=debug,tower_http=debug"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn logging_format_selects_json() {
        let mut config = valid_config();
        assert!(!config.logging.is_json());

        config.logging.format = "json".to_string();
        assert!(config.logging.is_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_logging_settings() {
        let mut config = valid_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
