use async_trait::async_trait;

use super::{SiteChecker, regex_probe};
use crate::fetcher::HttpFetcher;
use crate::models::Product;
use crate::utils::error::Result;

const SITE_NAME: &str = "Benson Boone";
const BASE_URL: &str = "https://store.bensonboone.com";

/// Checker for signed Benson Boone merchandise.
///
/// The store's search markup is unstable, so product URLs are harvested
/// with a regex and each product page is probed for stock individually.
#[derive(Debug, Default)]
pub struct BensonBooneChecker;

impl BensonBooneChecker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SiteChecker for BensonBooneChecker {
    fn site_name(&self) -> &str {
        SITE_NAME
    }

    fn search_url(&self) -> String {
        format!("{BASE_URL}/search?q=signed")
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn fetch_products(&self, fetcher: &HttpFetcher) -> Result<Vec<Product>> {
        regex_probe::find_in_stock_products(fetcher, SITE_NAME, BASE_URL, &self.search_url(), "signed")
            .await
    }

    fn email_subject(&self, new_products: &[Product], timestamp: &str) -> String {
        format!(
            "🎤 Benson Boone SIGNED Items Alert! - {} item(s) - {}",
            new_products.len(),
            timestamp
        )
    }

    fn email_intro(&self) -> String {
        "SIGNED BENSON BOONE ITEMS ARE AVAILABLE! 🎤\n".to_string()
    }
}
