//! Cross-source de-duplication.

use std::collections::HashSet;

use bmart_core::ProductId;
use tracing::debug;

use crate::types::Product;

/// Identity key for a product title: trimmed and lowercased.
#[must_use]
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Keep the first product for every title key and every id.
///
/// Arrival order is preserved.
#[must_use]
pub fn dedupe(products: Vec<Product>) -> Vec<Product> {
    let before = products.len();
    let mut titles: HashSet<String> = HashSet::with_capacity(before);
    let mut ids: HashSet<ProductId> = HashSet::with_capacity(before);

    let kept: Vec<Product> = products
        .into_iter()
        .filter(|product| {
            let key = title_key(&product.title);
            if titles.contains(&key) || ids.contains(&product.id) {
                return false;
            }
            titles.insert(key);
            ids.insert(product.id);
            true
        })
        .collect();

    if kept.len() < before {
        debug!(before, after = kept.len(), "Removed duplicate products");
    }
    kept
}
