use std::collections::BTreeSet;

use regex::Regex;
use tracing::debug;

use super::resolve_url;
use crate::fetcher::HttpFetcher;
use crate::models::{Product, canonical_id};
use crate::utils::error::{AppError, Result};

/// Shared fetch logic for stores without a stable card layout: harvest
/// `/products/...<term>...` URLs from the raw search HTML with a regex,
/// then probe each product page for stock.
pub(crate) async fn find_in_stock_products(
    fetcher: &HttpFetcher,
    site: &str,
    base_url: &str,
    search_url: &str,
    search_term: &str,
) -> Result<Vec<Product>> {
    let html = fetcher.get_html(search_url).await?;

    let pattern = format!(r#"(?i)(/products/[^"\s?]*?{search_term}[^"\s?]*)"#);
    let url_re = Regex::new(&pattern)
        .map_err(|e| AppError::parse(site, format!("bad product-url pattern: {e}")))?;

    // BTreeSet both dedupes and gives a stable probe order.
    let urls: BTreeSet<String> = url_re
        .find_iter(&html)
        .map(|m| resolve_url(base_url, m.as_str()))
        .collect();

    debug!(site, count = urls.len(), "product URLs to check");
    let mut products = Vec::new();

    for url in urls {
        let page = match fetcher.get_html(&url).await {
            Ok(page) => page,
            Err(err) => {
                debug!(site, %url, %err, "skipping product page");
                continue;
            }
        };

        if let Some(product) = in_stock_product(&page, &url) {
            debug!(site, title = %product.title, "found in-stock");
            products.push(product);
        }
    }

    Ok(products)
}

/// Build a Product from a detail page, or None when the page reads as
/// sold out.
fn in_stock_product(html: &str, url: &str) -> Option<Product> {
    if is_sold_out(html) {
        return None;
    }

    let title = page_title(html).unwrap_or_else(|| "Signed Item".to_string());
    Some(
        Product::new(title, canonical_id(url))
            .with_price("See listing")
            .with_signed(true)
            .with_available(true),
    )
}

fn is_sold_out(html: &str) -> bool {
    let lower = html.to_lowercase();
    let marked = html.contains("<strong>Sorry Sold out</strong>")
        || html.contains(r#"aria-disabled="true""#)
        || lower.contains("sold-out")
        || lower.contains("sold_out");
    // Themes without an explicit badge still repeat "sold out" across the
    // variant picker once everything is gone.
    marked || lower.matches("sold out").count() >= 6
}

fn page_title(html: &str) -> Option<String> {
    let start = html.find("<title>")? + "<title>".len();
    let end = html[start..].find("</title>")? + start;
    let raw = &html[start..end];
    let cleaned = raw
        .split('–')
        .next()
        .unwrap_or(raw)
        .split('|')
        .next()
        .unwrap_or(raw)
        .trim();
    if cleaned.is_empty() { None } else { Some(cleaned.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetcherConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sold_out_markers() {
        assert!(is_sold_out("x <strong>Sorry Sold out</strong> y"));
        assert!(is_sold_out(r#"<button aria-disabled="true">Add</button>"#));
        assert!(is_sold_out("<div class='sold-out'></div>"));
        assert!(is_sold_out(&"sold out ".repeat(6)));
        assert!(!is_sold_out("<button>Add to cart</button> sold out once"));
    }

    #[test]
    fn test_page_title_cleanup() {
        assert_eq!(
            page_title("<title>Signed CD – Benson Boone Store</title>").as_deref(),
            Some("Signed CD")
        );
        assert_eq!(
            page_title("<title>Signed LP | Official Store</title>").as_deref(),
            Some("Signed LP")
        );
        assert_eq!(page_title("<body>no title</body>"), None);
    }

    #[test]
    fn test_in_stock_product_strips_query() {
        let product =
            in_stock_product("<title>Signed CD</title>", "https://x.com/products/signed-cd?t=1")
                .unwrap();
        assert_eq!(product.id, "https://x.com/products/signed-cd");
        assert_eq!(product.available, Some(true));
    }

    #[tokio::test]
    async fn test_find_in_stock_end_to_end() {
        let server = MockServer::start().await;
        let search_body = format!(
            r#"<a href="/products/the-album-signed-cd">x</a>
               <a href="/products/signed-poster">y</a>
               <a href="/products/plain-tee">z</a>
               <a href="{}/products/the-album-signed-cd">dupe</a>"#,
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(search_body))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products/the-album-signed-cd"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<title>The Album Signed CD</title><button>Add to cart</button>"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products/signed-poster"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<title>Signed Poster</title><strong>Sorry Sold out</strong>"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetcherConfig {
            request_timeout: 5,
            user_agent: "test".to_string(),
        })
        .unwrap();

        let products = find_in_stock_products(
            &fetcher,
            "Test Site",
            &server.uri(),
            &format!("{}/search", server.uri()),
            "signed",
        )
        .await
        .unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "The Album Signed CD");
        assert!(products[0].id.ends_with("/products/the-album-signed-cd"));
    }
}
