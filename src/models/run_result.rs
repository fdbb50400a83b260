use serde::{Deserialize, Serialize};

use super::Product;

/// Outcome of one site's run, collected by the runner so one site's
/// failure never aborts the others.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub site: String,
    pub fetched_count: usize,
    pub new_products: Vec<Product>,
    pub error: Option<String>,
}

impl RunResult {
    pub fn ok(site: impl Into<String>, fetched_count: usize, new_products: Vec<Product>) -> Self {
        Self {
            site: site.into(),
            fetched_count,
            new_products,
            error: None,
        }
    }

    pub fn failed(site: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            fetched_count: 0,
            new_products: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_result() {
        let result = RunResult::ok("Jonas Brothers", 12, Vec::new());
        assert!(result.is_ok());
        assert_eq!(result.fetched_count, 12);
    }

    #[test]
    fn test_failed_result() {
        let result = RunResult::failed("Taylor Swift", "Fetch error: timed out");
        assert!(!result.is_ok());
        assert_eq!(result.error.as_deref(), Some("Fetch error: timed out"));
        assert_eq!(result.fetched_count, 0);
    }
}
