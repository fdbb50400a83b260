use async_trait::async_trait;
use url::Url;

use crate::fetcher::HttpFetcher;
use crate::models::Product;
use crate::utils::error::Result;

mod banquet_records;
mod benson_boone;
mod gracie_abrams;
mod jonas_brothers;
mod noah_kahan_store;
mod regex_probe;
mod taylor_swift;

pub use banquet_records::BanquetRecordsChecker;
pub use benson_boone::BensonBooneChecker;
pub use gracie_abrams::GracieAbramsChecker;
pub use jonas_brothers::JonasBrothersChecker;
pub use noah_kahan_store::NoahKahanStoreChecker;
pub use taylor_swift::TaylorSwiftChecker;

/// One storefront checker. Implementations differ only in where they look
/// and how they turn page content into products; diffing, notification,
/// and persistence are the runner's job.
#[async_trait]
pub trait SiteChecker: Send + Sync {
    /// Human-readable site name (e.g., "Jonas Brothers").
    fn site_name(&self) -> &str;

    /// URL checked for products.
    fn search_url(&self) -> String;

    /// Base URL for resolving relative links.
    fn base_url(&self) -> &str;

    /// Fetch and parse the current product list. No side effects beyond
    /// the network requests.
    async fn fetch_products(&self, fetcher: &HttpFetcher) -> Result<Vec<Product>>;

    fn email_subject(&self, new_products: &[Product], timestamp: &str) -> String;

    fn email_intro(&self) -> String;

    /// Cooldown for signed-restock re-alerts. Sites returning `Some` get a
    /// second notification channel: in-stock signed items re-alert once
    /// the cooldown has elapsed, independent of the seen set.
    fn restock_cooldown(&self) -> Option<chrono::Duration> {
        None
    }

    fn restock_subject(&self, _products: &[Product], _timestamp: &str) -> String {
        String::new()
    }

    fn restock_intro(&self) -> String {
        String::new()
    }
}

type BuildFn = fn() -> Box<dyn SiteChecker>;

/// A registered site: command token, display name, and constructor.
pub struct SiteEntry {
    pub token: &'static str,
    pub name: &'static str,
    pub default_enabled: bool,
    build: BuildFn,
}

impl SiteEntry {
    pub fn build(&self) -> Box<dyn SiteChecker> {
        (self.build)()
    }
}

/// Static site registry: token -> constructor. Add new sites here.
pub static REGISTRY: &[SiteEntry] = &[
    SiteEntry {
        token: "jonas",
        name: "Jonas Brothers",
        default_enabled: true,
        build: || Box::new(JonasBrothersChecker::new()),
    },
    SiteEntry {
        token: "noah",
        name: "Banquet Records - Noah Kahan",
        default_enabled: true,
        build: || Box::new(BanquetRecordsChecker::for_artist("Noah Kahan")),
    },
    SiteEntry {
        token: "noah-store",
        name: "Noah Kahan Store",
        default_enabled: true,
        build: || Box::new(NoahKahanStoreChecker::new()),
    },
    SiteEntry {
        token: "benson",
        name: "Benson Boone",
        default_enabled: true,
        build: || Box::new(BensonBooneChecker::new()),
    },
    SiteEntry {
        token: "gracie",
        name: "Gracie Abrams",
        default_enabled: true,
        build: || Box::new(GracieAbramsChecker::new()),
    },
    SiteEntry {
        token: "taylor",
        name: "Taylor Swift",
        default_enabled: true,
        build: || Box::new(TaylorSwiftChecker::new()),
    },
];

pub fn find_entry(token: &str) -> Option<&'static SiteEntry> {
    REGISTRY.iter().find(|entry| entry.token == token)
}

pub fn default_tokens() -> Vec<&'static str> {
    REGISTRY
        .iter()
        .filter(|entry| entry.default_enabled)
        .map(|entry| entry.token)
        .collect()
}

pub fn all_tokens() -> Vec<&'static str> {
    REGISTRY.iter().map(|entry| entry.token).collect()
}

/// Compile a CSS selector, surfacing failures as parse errors attributed
/// to the site. Selectors live in code, so this only fires after a typo.
pub(crate) fn css(site: &str, selector: &str) -> Result<scraper::Selector> {
    scraper::Selector::parse(selector).map_err(|e| {
        crate::utils::error::AppError::parse(site, format!("invalid selector '{selector}': {e:?}"))
    })
}

/// Collapsed text content of an element, whitespace-trimmed.
pub(crate) fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a possibly relative href against a site's base URL. Falls back
/// to the href unchanged when the base itself does not parse.
pub fn resolve_url(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_tokens_are_unique() {
        let mut tokens: Vec<&str> = REGISTRY.iter().map(|e| e.token).collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), REGISTRY.len());
    }

    #[test]
    fn test_find_entry() {
        assert!(find_entry("taylor").is_some());
        assert!(find_entry("bogus").is_none());
    }

    #[test]
    fn test_default_tokens_cover_registry() {
        assert_eq!(default_tokens(), all_tokens());
    }

    #[test]
    fn test_build_produces_matching_checker() {
        let entry = find_entry("jonas").unwrap();
        let checker = entry.build();
        assert_eq!(checker.site_name(), entry.name);
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://shop.example.com", "/products/signed-cd"),
            "https://shop.example.com/products/signed-cd"
        );
        assert_eq!(
            resolve_url("https://shop.example.com", "https://other.com/x"),
            "https://other.com/x"
        );
        // Scheme-relative hrefs keep the base's scheme
        assert_eq!(
            resolve_url("https://shop.example.com", "//cdn.example.com/img.png"),
            "https://cdn.example.com/img.png"
        );
    }
}
