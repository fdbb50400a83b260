use async_trait::async_trait;
use scraper::Html;

use super::{SiteChecker, css, element_text, resolve_url};
use crate::fetcher::HttpFetcher;
use crate::models::Product;
use crate::utils::error::Result;

const SITE_NAME: &str = "Jonas Brothers";
const BASE_URL: &str = "https://shop.jonasbrothers.com";

/// Checker for signed Jonas Brothers merchandise.
///
/// The search is pre-filtered to available signed items, so every card in
/// the grid counts.
///
/// Structure:
///   div.grid-product__content
///     a.grid-product__link (href)
///     div.grid-product__title (title)
///     div.grid-product__price (price)
#[derive(Debug, Default)]
pub struct JonasBrothersChecker;

impl JonasBrothersChecker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SiteChecker for JonasBrothersChecker {
    fn site_name(&self) -> &str {
        SITE_NAME
    }

    fn search_url(&self) -> String {
        format!("{BASE_URL}/search?type=product&q=signed*&filter.v.availability=1")
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn fetch_products(&self, fetcher: &HttpFetcher) -> Result<Vec<Product>> {
        let html = fetcher.get_html(&self.search_url()).await?;
        parse_search_page(&html)
    }

    fn email_subject(&self, new_products: &[Product], timestamp: &str) -> String {
        format!(
            "🎸 Jonas Brothers SIGNED Items Alert! - {} item(s) - {}",
            new_products.len(),
            timestamp
        )
    }

    fn email_intro(&self) -> String {
        "NEW SIGNED JONAS BROTHERS ITEMS ARE AVAILABLE! 🎸\n".to_string()
    }
}

fn parse_search_page(html: &str) -> Result<Vec<Product>> {
    let document = Html::parse_document(html);
    let card_sel = css(SITE_NAME, "div.grid-product__content")?;
    let link_sel = css(SITE_NAME, "a.grid-product__link")?;
    let title_sel = css(SITE_NAME, "div.grid-product__title")?;
    let price_sel = css(SITE_NAME, "div.grid-product__price")?;

    let mut products = Vec::new();

    for card in document.select(&card_sel) {
        let Some(link) = card.select(&link_sel).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let url = resolve_url(BASE_URL, href);

        let title = card
            .select(&title_sel)
            .next()
            .map(|t| element_text(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Unknown Title".to_string());

        let mut product = Product::new(title, url).with_signed(true);
        if let Some(price) = card.select(&price_sel).next() {
            let price = element_text(&price);
            if !price.is_empty() {
                product = product.with_price(price);
            }
        }
        products.push(product);
    }

    Ok(products)
}
