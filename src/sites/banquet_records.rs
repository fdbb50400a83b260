use async_trait::async_trait;
use scraper::Html;
use tracing::debug;

use super::{SiteChecker, css, element_text, resolve_url};
use crate::fetcher::HttpFetcher;
use crate::models::Product;
use crate::utils::error::Result;

const BASE_URL: &str = "https://www.banquetrecords.com";

/// Checker for signed items at Banquet Records, optionally filtered to
/// one artist.
///
/// Two-step: the search page lists products tagged as signed but not
/// whether the signed variant is in stock, so each product's detail page
/// is probed for purchasable signed variants.
///
/// Search structure:
///   a.card.item
///     span.artist / span.title / span.formats
///     span.promo.signed
/// Detail structure:
///   div.row.format
///     div.name / div.price / div.options / div.copies
///     a#add... (present only when purchasable)
#[derive(Debug)]
pub struct BanquetRecordsChecker {
    artist: Option<String>,
    name: String,
}

impl BanquetRecordsChecker {
    pub fn new() -> Self {
        Self {
            artist: None,
            name: "Banquet Records".to_string(),
        }
    }

    pub fn for_artist(artist: &str) -> Self {
        Self {
            artist: Some(artist.to_string()),
            name: format!("Banquet Records - {artist}"),
        }
    }
}

#[async_trait]
impl SiteChecker for BanquetRecordsChecker {
    fn site_name(&self) -> &str {
        &self.name
    }

    fn search_url(&self) -> String {
        match &self.artist {
            Some(artist) => {
                format!("{BASE_URL}/search?q={}&t=signed", artist.replace(' ', "+"))
            }
            None => format!("{BASE_URL}/search?t=signed"),
        }
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }

    async fn fetch_products(&self, fetcher: &HttpFetcher) -> Result<Vec<Product>> {
        let html = fetcher.get_html(&self.search_url()).await?;
        let candidates = parse_search_page(&self.name, &html)?;

        let mut products = Vec::new();
        for candidate in &candidates {
            debug!(site = %self.name, title = %candidate.title, "checking product page");
            let detail = match fetcher.get_html(&candidate.url).await {
                Ok(page) => page,
                Err(err) => {
                    debug!(site = %self.name, url = %candidate.url, %err, "skipping product page");
                    continue;
                }
            };

            let variants = parse_signed_variants(&self.name, &detail)?;
            if variants.is_empty() {
                debug!(site = %self.name, title = %candidate.title, "no signed variants in stock");
            }
            for variant in variants {
                products.push(
                    Product::new(
                        format!("{} ({})", candidate.title, variant.name),
                        candidate.url.clone(),
                    )
                    .with_price(variant.price)
                    .with_signed(true)
                    .with_available(true),
                );
            }
        }

        debug!(
            site = %self.name,
            checked = candidates.len(),
            in_stock = products.len(),
            "product pages probed"
        );
        Ok(products)
    }

    fn email_subject(&self, new_products: &[Product], timestamp: &str) -> String {
        let artist_text = self
            .artist
            .as_deref()
            .map(|a| format!(" {a}"))
            .unwrap_or_default();
        format!(
            "🎵 Banquet Records{} SIGNED Alert! - {} item(s) - {}",
            artist_text,
            new_products.len(),
            timestamp
        )
    }

    fn email_intro(&self) -> String {
        match &self.artist {
            Some(artist) => format!(
                "SIGNED {} ITEMS ARE IN STOCK AT BANQUET RECORDS! 🎵\n",
                artist.to_uppercase()
            ),
            None => "SIGNED ITEMS ARE IN STOCK AT BANQUET RECORDS! 🎵\n".to_string(),
        }
    }
}

struct Candidate {
    title: String,
    url: String,
}

struct SignedVariant {
    name: String,
    price: String,
}

fn parse_search_page(site: &str, html: &str) -> Result<Vec<Candidate>> {
    let document = Html::parse_document(html);
    // Only "item" cards; plain a.card elements are category links.
    let card_sel = css(site, "a.card.item")?;
    let artist_sel = css(site, "span.artist")?;
    let title_sel = css(site, "span.title")?;
    let signed_sel = css(site, "span.signed")?;

    let mut candidates = Vec::new();

    for card in document.select(&card_sel) {
        // The t=signed filter should make this redundant, but skip
        // anything without the badge anyway.
        if card.select(&signed_sel).next().is_none() {
            continue;
        }

        let Some(href) = card.value().attr("href") else {
            continue;
        };
        let url = resolve_url(BASE_URL, &format!("/{}", href.trim_start_matches('/')));

        let artist = card
            .select(&artist_sel)
            .next()
            .map(|a| element_text(&a))
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Unknown Artist".to_string());
        let title = card
            .select(&title_sel)
            .next()
            .map(|t| element_text(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Unknown Title".to_string());

        candidates.push(Candidate {
            title: format!("{artist} - {title}"),
            url,
        });
    }

    Ok(candidates)
}

fn parse_signed_variants(site: &str, html: &str) -> Result<Vec<SignedVariant>> {
    let document = Html::parse_document(html);
    let row_sel = css(site, "div.row.format")?;
    let name_sel = css(site, "div.name")?;
    let price_sel = css(site, "div.price")?;
    let options_sel = css(site, "div.options")?;
    let copies_sel = css(site, "div.copies")?;
    let add_sel = css(site, r#"a[id^="add"]"#)?;

    let mut variants = Vec::new();

    for row in document.select(&row_sel) {
        let Some(name) = row.select(&name_sel).next().map(|n| element_text(&n)) else {
            continue;
        };
        if !name.to_lowercase().contains("signed") {
            continue;
        }

        if row.select(&add_sel).next().is_none() {
            // No add-to-cart link; confirm it is actually gone rather
            // than a markup variation, then skip either way.
            let sold_out = row
                .select(&options_sel)
                .next()
                .map(|o| element_text(&o).to_lowercase().contains("sold out"))
                .unwrap_or(false)
                || row
                    .select(&copies_sel)
                    .next()
                    .map(|c| element_text(&c).to_lowercase().contains("0 left"))
                    .unwrap_or(false);
            debug!(site, variant = %name, sold_out, "variant not purchasable");
            continue;
        }

        let price = row
            .select(&price_sel)
            .next()
            .map(|p| element_text(&p))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "Price N/A".to_string());

        variants.push(SignedVariant { name, price });
    }

    Ok(variants)
}
