pub mod product;
pub mod run_result;
pub mod seen_set;

// Re-exports for convenience
pub use product::*;
pub use run_result::*;
pub use seen_set::*;

/// Site name safe for file paths (lowercase, underscores, no apostrophes).
pub fn safe_name(site_name: &str) -> String {
    site_name
        .to_lowercase()
        .replace(' ', "_")
        .replace(['\'', '-'], "")
}
