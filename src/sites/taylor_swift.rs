use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::SiteChecker;
use crate::fetcher::HttpFetcher;
use crate::models::Product;
use crate::utils::error::{AppError, Result};

const SITE_NAME: &str = "Taylor Swift";
const BASE_URL: &str = "https://store.taylorswift.com";

// Shopify caps products.json at 250 per page.
const PAGE_LIMIT: u32 = 250;
const MAX_PAGES: u32 = 20;

/// Checker for the Taylor Swift Official Store.
///
/// Reads the Shopify JSON API instead of scraping HTML pages; the full
/// catalog comes back in a couple of requests. Two notification types:
/// new items through the standard diff, and signed items in stock through
/// the restock channel with a 2-hour per-item cooldown.
#[derive(Debug, Default)]
pub struct TaylorSwiftChecker;

impl TaylorSwiftChecker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SiteChecker for TaylorSwiftChecker {
    fn site_name(&self) -> &str {
        SITE_NAME
    }

    fn search_url(&self) -> String {
        format!("{BASE_URL}/products.json?limit={PAGE_LIMIT}")
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn fetch_products(&self, fetcher: &HttpFetcher) -> Result<Vec<Product>> {
        let mut products = Vec::new();

        for page in 1..=MAX_PAGES {
            let url = format!("{}&page={page}", self.search_url());
            let response: ProductsResponse = fetcher.get_json(&url).await?;
            if response.products.is_empty() {
                break;
            }

            debug!(site = SITE_NAME, page, count = response.products.len(), "page fetched");
            products.extend(response.products.into_iter().map(to_product));
        }

        // The store always lists hundreds of products; an empty catalog
        // means the API shape changed, not that everything sold out.
        if products.is_empty() {
            return Err(AppError::parse(SITE_NAME, "products.json returned no products"));
        }

        debug!(site = SITE_NAME, total = products.len(), "products fetched");
        Ok(products)
    }

    fn email_subject(&self, new_products: &[Product], timestamp: &str) -> String {
        format!(
            "🎵 {} New Taylor Swift Store Item(s)! - {}",
            new_products.len(),
            timestamp
        )
    }

    fn email_intro(&self) -> String {
        "New items just appeared in the Taylor Swift Official Store!\n".to_string()
    }

    fn restock_cooldown(&self) -> Option<chrono::Duration> {
        Some(chrono::Duration::hours(2))
    }

    fn restock_subject(&self, products: &[Product], timestamp: &str) -> String {
        format!(
            "🚨 SIGNED Taylor Swift Items IN STOCK! - {} item(s) - {}",
            products.len(),
            timestamp
        )
    }

    fn restock_intro(&self) -> String {
        "🚨 SIGNED TAYLOR SWIFT ITEMS ARE IN STOCK! 🚨\n\n\
         GO GO GO! These signed items are currently showing as AVAILABLE:\n"
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<ShopifyProduct>,
}

#[derive(Debug, Deserialize)]
struct ShopifyProduct {
    #[serde(default)]
    title: String,
    #[serde(default)]
    handle: String,
    #[serde(default)]
    variants: Vec<ShopifyVariant>,
}

#[derive(Debug, Deserialize)]
struct ShopifyVariant {
    #[serde(default)]
    available: bool,
    #[serde(default)]
    price: Option<String>,
}

fn to_product(p: ShopifyProduct) -> Product {
    let available = p.variants.iter().any(|v| v.available);
    let price = p.variants.first().and_then(|v| v.price.as_deref()).map(format_price);

    let haystack = format!("{} {}", p.title, p.handle).to_lowercase();
    let signed = haystack.contains("signed") || haystack.contains("autograph");

    let title = if p.title.is_empty() { "Unknown".to_string() } else { p.title };
    let mut product = Product::new(title, format!("{BASE_URL}/products/{}", p.handle))
        .with_signed(signed)
        .with_available(available);
    if let Some(price) = price {
        product = product.with_price(price);
    }
    product
}

fn format_price(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(value) => format!("${value:.2}"),
        Err(_) => raw.to_string(),
    }
}
