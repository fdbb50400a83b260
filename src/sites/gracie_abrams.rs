use async_trait::async_trait;

use super::{SiteChecker, regex_probe};
use crate::fetcher::HttpFetcher;
use crate::models::Product;
use crate::utils::error::Result;

const SITE_NAME: &str = "Gracie Abrams";
const BASE_URL: &str = "https://shop.gracieabrams.com";

/// Checker for signed Gracie Abrams merchandise. Same regex-probe
/// approach as the Benson Boone checker.
#[derive(Debug, Default)]
pub struct GracieAbramsChecker;

impl GracieAbramsChecker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SiteChecker for GracieAbramsChecker {
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
            "✨ Gracie Abrams SIGNED Items Alert! - {} item(s) - {}",
            new_products.len(),
            timestamp
        )
    }

    fn email_intro(&self) -> String {
        "SIGNED GRACIE ABRAMS ITEMS ARE AVAILABLE! ✨\n".to_string()
    }
}
