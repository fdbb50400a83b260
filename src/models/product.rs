use serde::{Deserialize, Serialize};

/// A single listing extracted from a storefront page.
///
/// Products are ephemeral: they are rebuilt on every fetch and only their
/// ids survive in the seen set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    /// Stable identity key: the absolute product URL with any query
    /// string stripped. Re-fetching the same live listing yields the
    /// same id.
    pub id: String,
    pub title: String,
    pub url: String,
    pub price: Option<String>,
    /// Whether the source flags this listing as signed/autographed.
    pub signed: Option<bool>,
    /// Whether any variant is currently purchasable, where the source
    /// exposes it.
    pub available: Option<bool>,
}

impl Product {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: canonical_id(&url),
            title: title.into(),
            url,
            price: None,
            signed: None,
            available: None,
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = Some(signed);
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    pub fn price_display(&self) -> &str {
        self.price.as_deref().unwrap_or("Price N/A")
    }
}

/// Canonical identity for a listing: the URL without its query string.
/// Cache busters and tracking parameters must not produce new identities.
pub fn canonical_id(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}
