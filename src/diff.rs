use std::collections::{BTreeSet, HashSet};

use crate::models::Product;

/// Items in `fetched` whose id is not in `seen`, in fetch order,
/// de-duplicated by id keeping the first occurrence.
///
/// Pure: an empty fetch yields an empty result no matter what `seen`
/// holds. Disappeared listings are never reported.
pub fn diff(fetched: &[Product], seen: &BTreeSet<String>) -> Vec<Product> {
    let mut emitted: HashSet<&str> = HashSet::new();
    fetched
        .iter()
        .filter(|p| !seen.contains(&p.id) && emitted.insert(p.id.as_str()))
        .cloned()
        .collect()
}
