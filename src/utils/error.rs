use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Parse error: {site}: {message}")]
    Parse { site: String, message: String },

    #[error("Lock timeout: a run is already in progress for {site}")]
    LockTimeout { site: String },

    #[error("Notify error: {0}")]
    Notify(String),

    #[error("Unknown site: {token}")]
    UnknownSite { token: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn parse(site: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Parse {
            site: site.into(),
            message: message.into(),
        }
    }
}

// Network and transport failures all land in the Fetch/Notify buckets so the
// runner can classify them without matching on foreign error types.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for AppError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        AppError::Notify(err.to_string())
    }
}

impl From<lettre::error::Error> for AppError {
    fn from(err: lettre::error::Error) -> Self {
        AppError::Notify(err.to_string())
    }
}

impl From<lettre::address::AddressError> for AppError {
    fn from(err: lettre::address::AddressError) -> Self {
        AppError::Notify(format!("invalid address: {}", err))
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_parse_error_display() {
        let err = AppError::parse("Jonas Brothers", "no product cards in search results");
        assert_eq!(
            err.to_string(),
            "Parse error: Jonas Brothers: no product cards in search results"
        );
    }

    #[test]
    fn test_lock_timeout_display() {
        let err = AppError::LockTimeout {
            site: "taylor_swift".to_string(),
        };
        assert!(err.to_string().contains("already in progress"));
        assert!(err.to_string().contains("taylor_swift"));
    }

    #[test]
    fn test_unknown_site_display() {
        let err = AppError::UnknownSite {
            token: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown site: bogus");
    }
}
