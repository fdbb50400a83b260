use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub smtp: SmtpConfig,
    pub storage: StorageConfig,
    pub fetcher: FetcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub from_name: String,
    /// Comma-separated recipient addresses.
    pub recipients: String,
    pub use_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub log_retention_days: u32,
    pub lock_stale_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub request_timeout: u64,
    pub user_agent: String,
}

impl SmtpConfig {
    pub fn recipient_list(&self) -> Vec<String> {
        self.recipients
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The sender address, falling back to the username when unset.
    pub fn sender_address(&self) -> Option<&str> {
        self.from_address
            .as_deref()
            .or(self.username.as_deref())
    }

    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some() && !self.recipient_list().is_empty()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let s = Config::builder()
            // Baked-in defaults so the tool runs without any config file
            .set_default("smtp.host", "smtp.gmail.com")?
            .set_default("smtp.port", 465)?
            .set_default("smtp.from_name", "Merch Watch")?
            .set_default("smtp.recipients", "")?
            .set_default("smtp.use_tls", true)?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.log_retention_days", 30)?
            .set_default("storage.lock_stale_secs", 600)?
            .set_default("fetcher.request_timeout", 15)?
            .set_default("fetcher.user_agent", DEFAULT_USER_AGENT)?
            // Optional configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Environment variables with prefix "MERCH_WATCH_"
            .add_source(Environment::with_prefix("MERCH_WATCH").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if self.smtp.username.is_some() && self.recipient_list_empty() {
            return Err(ConfigError::Message(
                "SMTP credentials are set but no recipients are configured".into(),
            ));
        }

        if self.storage.log_retention_days == 0 {
            return Err(ConfigError::Message(
                "storage.log_retention_days must be at least 1".into(),
            ));
        }

        if self.storage.lock_stale_secs == 0 {
            return Err(ConfigError::Message(
                "storage.lock_stale_secs must be greater than 0".into(),
            ));
        }

        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message(
                "fetcher.request_timeout must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn recipient_list_empty(&self) -> bool {
        self.smtp.recipient_list().is_empty()
    }
}

// Browser-like UA so storefronts serve the full markup
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            smtp: SmtpConfig {
                host: "smtp.gmail.com".to_string(),
                port: 465,
                username: Some("watcher@example.com".to_string()),
                password: Some("secret".to_string()),
                from_address: None,
                from_name: "Merch Watch".to_string(),
                recipients: "a@example.com, b@example.com".to_string(),
                use_tls: true,
            },
            storage: StorageConfig {
                data_dir: "data".to_string(),
                log_retention_days: 30,
                lock_stale_secs: 600,
            },
            fetcher: FetcherConfig {
                request_timeout: 15,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
        }
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_port() {
        let mut config = valid_config();
        config.smtp.port = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("port must be greater than 0"));
    }

    #[test]
    fn test_config_validation_credentials_without_recipients() {
        let mut config = valid_config();
        config.smtp.recipients = String::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no recipients"));
    }

    #[test]
    fn test_config_validation_zero_retention() {
        let mut config = valid_config();
        config.storage.log_retention_days = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_recipient_list_parsing() {
        let config = valid_config();
        assert_eq!(
            config.smtp.recipient_list(),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );

        let mut empty = valid_config();
        empty.smtp.recipients = " , ,".to_string();
        assert!(empty.smtp.recipient_list().is_empty());
    }

    #[test]
    fn test_sender_address_fallback() {
        let mut config = valid_config();
        assert_eq!(config.smtp.sender_address(), Some("watcher@example.com"));

        config.smtp.from_address = Some("alerts@example.com".to_string());
        assert_eq!(config.smtp.sender_address(), Some("alerts@example.com"));
    }

    #[test]
    fn test_is_configured() {
        let config = valid_config();
        assert!(config.smtp.is_configured());

        let mut missing_password = valid_config();
        missing_password.smtp.password = None;
        assert!(!missing_password.smtp.is_configured());
    }
}
