use async_trait::async_trait;
use scraper::Html;

use super::{SiteChecker, css, element_text, resolve_url};
use crate::fetcher::HttpFetcher;
use crate::models::Product;
use crate::utils::error::Result;

const SITE_NAME: &str = "Noah Kahan Store";
const BASE_URL: &str = "https://noahkahan.com";

/// Checker for signed items at Noah Kahan's official store.
///
/// Shopify theme with product cards:
///   div.product_card (plus a sold-out modifier class when out of stock)
///     a[href*="/products/"] - product link
///     div.card__title p - title
///     span.price__current - price
#[derive(Debug, Default)]
pub struct NoahKahanStoreChecker;

impl NoahKahanStoreChecker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SiteChecker for NoahKahanStoreChecker {
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
        let html = fetcher.get_html(&self.search_url()).await?;
        parse_search_page(&html)
    }

    fn email_subject(&self, new_products: &[Product], timestamp: &str) -> String {
        format!(
            "🎵 Noah Kahan Store SIGNED Alert! - {} item(s) - {}",
            new_products.len(),
            timestamp
        )
    }

    fn email_intro(&self) -> String {
        "SIGNED NOAH KAHAN ITEMS ARE AVAILABLE AT THE OFFICIAL STORE! 🎵\n".to_string()
    }
}

fn parse_search_page(html: &str) -> Result<Vec<Product>> {
    let document = Html::parse_document(html);
    let card_sel = css(SITE_NAME, r#"div[class*="product_card"]"#)?;
    let alt_card_sel = css(SITE_NAME, "div.product-card")?;
    let sold_out_sel = css(SITE_NAME, r#"[class*="sold-out"], [class*="sold_out"]"#)?;
    let link_sel = css(SITE_NAME, r#"a[href*="/products/"]"#)?;
    let title_sel = css(SITE_NAME, r#"p[class*="text_body"], div.card__title p, h2, h3"#)?;
    let price_sel = css(SITE_NAME, r#"span[class*="price"], [class*="price"]"#)?;

    let mut cards: Vec<_> = document.select(&card_sel).collect();
    if cards.is_empty() {
        // Alternate Shopify theme
        cards = document.select(&alt_card_sel).collect();
    }

    let mut products = Vec::new();

    for card in cards {
        let classes = card.value().attr("class").unwrap_or_default().to_lowercase();
        if classes.contains("sold-out") || classes.contains("sold_out") {
            continue;
        }
        if card.select(&sold_out_sel).next().is_some() {
            continue;
        }

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

        // Only signed items are interesting; the search also matches
        // lyric references and such.
        if !title.to_lowercase().contains("signed") {
            continue;
        }

        let mut product = Product::new(title, url).with_signed(true).with_available(true);
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

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_FIXTURE: &str = r#"
        <html><body>
          <div class="product_card">
            <a href="/products/signed-stick-season-cd">x</a>
            <div class="card__title"><p>Stick Season (Signed CD)</p></div>
            <span class="price__current">$29.99</span>
          </div>
          <div class="product_card product_card--sold-out">
            <a href="/products/signed-vinyl">x</a>
            <div class="card__title"><p>Signed Vinyl</p></div>
          </div>
          <div class="product_card">
            <a href="/products/tour-tee">x</a>
            <div class="card__title"><p>Tour Tee</p></div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_keeps_in_stock_signed_items_only() {
        let products = parse_search_page(SEARCH_FIXTURE).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Stick Season (Signed CD)");
        assert_eq!(products[0].url, "https://noahkahan.com/products/signed-stick-season-cd");
        assert_eq!(products[0].price.as_deref(), Some("$29.99"));
        assert_eq!(products[0].available, Some(true));
    }

    #[test]
    fn test_parse_alternate_card_class() {
        let html = r#"
            <div class="product-card">
              <a href="/products/signed-poster">x</a>
              <h3>Signed Poster</h3>
            </div>
        "#;
        let products = parse_search_page(html).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Signed Poster");
        assert!(products[0].price.is_none());
    }

    #[test]
    fn test_parse_sold_out_badge_inside_card() {
        let html = r#"
            <div class="product_card">
              <span class="badge sold-out">Sold out</span>
              <a href="/products/signed-hat">x</a>
              <h3>Signed Hat</h3>
            </div>
        "#;
        let products = parse_search_page(html).unwrap();
        assert!(products.is_empty());
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(parse_search_page("<html></html>").unwrap().is_empty());
    }
}
