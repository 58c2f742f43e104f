//! Placeholder catalog data for when upstream sources are thin or down.

use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;

use bmart_core::{ApiSource, ProductId, SOURCE_ID_SPAN, round_cents};

use crate::types::{Product, Rating, placeholder_image};

const CATEGORIES: &[&str] = &[
    "electronics",
    "jewelery",
    "men clothing",
    "women clothing",
    "smartphones",
    "laptops",
    "home",
    "beauty",
];

const BRANDS: &[&str] = &[
    "Samsung", "Apple", "Sony", "Nike", "Adidas", "Zara", "Dell", "HP",
];

const QUALIFIERS: &[&str] = &["Pro", "Max", "Lite", "Premium", "Ultra", "Standard"];

const SALE_PROBABILITY: f64 = 0.4;

/// Category list used when no source returns any categories.
pub const FALLBACK_CATEGORIES: &[&str] = &[
    "electronics",
    "jewelery",
    "men clothing",
    "women clothing",
    "smartphones",
    "laptops",
    "fragrances",
    "skincare",
    "groceries",
    "home-decoration",
    "furniture",
    "tops",
];

/// [`FALLBACK_CATEGORIES`] as owned strings.
#[must_use]
pub fn fallback_categories() -> Vec<String> {
    FALLBACK_CATEGORIES.iter().map(|&c| c.to_owned()).collect()
}

/// Generates synthetic products in the [`ApiSource::Synthetic`] id range.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticGenerator;

impl SyntheticGenerator {
    /// Up to `count` products with local ids `1..=count`.
    ///
    /// The id range holds at most 999 products; larger requests are capped.
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Product> {
        let max = usize::try_from(SOURCE_ID_SPAN - 1).unwrap_or(usize::MAX);
        (1..=count.min(max))
            .filter_map(|i| i64::try_from(i).ok())
            .filter_map(|i| ProductId::new(ApiSource::Synthetic, i).ok())
            .map(|id| Self::product(id, rng))
            .collect()
    }

    fn product<R: Rng + ?Sized>(id: ProductId, rng: &mut R) -> Product {
        let category = *CATEGORIES.choose(rng).unwrap_or(&"electronics");
        let brand = *BRANDS.choose(rng).unwrap_or(&"Samsung");
        let qualifier = *QUALIFIERS.choose(rng).unwrap_or(&"Standard");

        let cents: i64 = rng.random_range(1_000..51_000);
        let rate: f64 = (rng.random_range(2.0..5.0_f64) * 10.0).round() / 10.0;

        Product {
            id,
            title: format!("{brand} {category} {qualifier} {}", id.local()),
            description: format!(
                "High-quality {category} product from {brand}. Features premium design and excellent performance for everyday use."
            ),
            price: round_cents(Decimal::new(cents, 2)),
            category: category.to_owned(),
            image: placeholder_image(id),
            rating: Rating {
                rate,
                count: rng.random_range(0..1000),
            },
            brand: brand.to_owned(),
            stock: rng.random_range(10..110),
            is_sale: rng.random_bool(SALE_PROBABILITY),
            discount_percentage: None,
            api_source: ApiSource::Synthetic,
        }
    }
}
