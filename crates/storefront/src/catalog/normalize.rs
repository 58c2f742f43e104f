//! Normalization from raw upstream JSON to [`Product`] and category names.
//!
//! Upstream payloads are loosely shaped and differ between providers, so
//! parsing works on [`serde_json::Value`] rather than typed structs. Missing
//! optional fields are filled with defaults; items that cannot be turned into
//! a product at all are reported as [`NormalizeError`] and skipped by
//! [`Normalizer::normalize_products`].

use rand::Rng;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use bmart_core::{ApiSource, ProductId, ProductIdError, round_cents};

use crate::types::{Product, Rating, placeholder_image};

/// Brand used when neither the source nor the title names one.
pub const GENERIC_BRAND: &str = "Generic Brand";

/// Brands recognized in product titles, in priority order.
pub const BRAND_KEYWORDS: &[&str] = &[
    "Samsung",
    "Apple",
    "Sony",
    "LG",
    "Dell",
    "HP",
    "Nike",
    "Adidas",
    "Puma",
    "Zara",
    "H&M",
    "Microsoft",
    "Canon",
    "Nikon",
];

const DEFAULT_RATE: f64 = 4.0;
const MAX_RATE: f64 = 5.0;
const FAKESTORE_DEFAULT_COUNT: u64 = 100;
const UNKNOWN_CATEGORY: &str = "unknown-category";

/// Errors for a single upstream item.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("product item is not a JSON object")]
    NotAnObject,

    #[error("product item is missing {0}")]
    MissingField(&'static str),

    #[error("invalid product id: {0}")]
    InvalidId(#[from] ProductIdError),

    #[error("invalid price: {0}")]
    InvalidPrice(String),
}

/// How to decide `is_sale` for sources that carry no discount data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SalePolicy {
    /// On sale with the given probability.
    Random { probability: f64 },
    Always,
    Never,
}

impl Default for SalePolicy {
    fn default() -> Self {
        Self::Random { probability: 0.3 }
    }
}

impl SalePolicy {
    fn decide<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        match self {
            Self::Random { probability } => rng.random_bool(probability.clamp(0.0, 1.0)),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Extract category names from a categories payload.
///
/// Accepts an array of strings or of objects carrying `slug` or `name`.
/// Anything else is logged and dropped.
#[must_use]
pub fn normalize_categories(raw: &Value) -> Vec<String> {
    let Some(items) = raw.as_array() else {
        warn!("Categories payload is not an array");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let name = match item {
                Value::String(s) => s.as_str(),
                Value::Object(map) => non_empty_str(map, "slug")
                    .or_else(|| non_empty_str(map, "name"))
                    .unwrap_or(UNKNOWN_CATEGORY),
                other => {
                    warn!(item = %other, "Skipping category of unexpected type");
                    return None;
                }
            };
            let name = name.trim();
            if name.is_empty() || name == UNKNOWN_CATEGORY {
                warn!(item = %item, "Skipping category without a usable name");
                return None;
            }
            Some(name.to_owned())
        })
        .collect()
}

/// The product list inside a products payload.
///
/// FakeStore returns a bare array; DummyJSON wraps it as `{"products": [...]}`.
#[must_use]
pub fn extract_product_items(raw: &Value) -> &[Value] {
    raw.as_array()
        .or_else(|| raw.get("products").and_then(Value::as_array))
        .map_or(&[][..], Vec::as_slice)
}

// =============================================================================
// Products
// =============================================================================

/// Converts upstream product items into [`Product`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    sale_policy: SalePolicy,
}

impl Normalizer {
    #[must_use]
    pub const fn new(sale_policy: SalePolicy) -> Self {
        Self { sale_policy }
    }

    /// Normalize every item, logging and dropping the ones that fail.
    pub fn normalize_products<R: Rng + ?Sized>(
        &self,
        source: ApiSource,
        items: &[Value],
        rng: &mut R,
    ) -> Vec<Product> {
        items
            .iter()
            .filter_map(|item| match self.normalize_product(source, item, rng) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(%source, error = %e, "Dropping malformed product");
                    None
                }
            })
            .collect()
    }

    /// Normalize one upstream item.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if the item is not an object, has no usable
    /// id, title or price, or its id does not fit the source's id range.
    pub fn normalize_product<R: Rng + ?Sized>(
        &self,
        source: ApiSource,
        item: &Value,
        rng: &mut R,
    ) -> Result<Product, NormalizeError> {
        let map = item.as_object().ok_or(NormalizeError::NotAnObject)?;

        let local = map
            .get("id")
            .and_then(Value::as_i64)
            .ok_or(NormalizeError::MissingField("id"))?;
        let id = ProductId::new(source, local)?;

        let title = non_empty_str(map, "title")
            .map(str::trim)
            .ok_or(NormalizeError::MissingField("title"))?
            .to_owned();

        let price = parse_price(map.get("price"))?;

        let discount = map
            .get("discountPercentage")
            .and_then(Value::as_f64)
            .map(|d| d.clamp(0.0, 100.0));

        let is_sale = match discount {
            Some(d) => d > 0.0,
            None => self.sale_policy.decide(rng),
        };

        let brand = non_empty_str(map, "brand")
            .map(|b| b.trim().to_owned())
            .unwrap_or_else(|| infer_brand(&title).to_owned());

        let product = Product {
            id,
            description: str_or_empty(map, "description"),
            price,
            category: str_or_empty(map, "category"),
            image: pick_image(map).unwrap_or_else(|| placeholder_image(id)),
            rating: parse_rating(source, map, rng),
            brand,
            stock: parse_stock(source, map, rng),
            is_sale,
            discount_percentage: discount,
            api_source: source,
            title,
        };

        debug!(id = %product.id, "Normalized product");
        Ok(product)
    }
}

/// First brand keyword appearing as a whole word in `title`.
#[must_use]
pub fn infer_brand(title: &str) -> &'static str {
    let words: Vec<String> = title
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | '(' | ')' | '/' | '.'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    BRAND_KEYWORDS
        .iter()
        .find(|keyword| {
            let keyword = keyword.to_lowercase();
            words.iter().any(|w| *w == keyword)
        })
        .copied()
        .unwrap_or(GENERIC_BRAND)
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn str_or_empty(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_owned()
}

fn parse_price(raw: Option<&Value>) -> Result<Decimal, NormalizeError> {
    let price = match raw {
        Some(Value::Number(n)) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .ok_or_else(|| NormalizeError::InvalidPrice(n.to_string()))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| NormalizeError::InvalidPrice(s.clone()))?,
        _ => return Err(NormalizeError::MissingField("price")),
    };

    if price.is_sign_negative() {
        return Err(NormalizeError::InvalidPrice(price.to_string()));
    }
    Ok(round_cents(price))
}

fn parse_rating<R: Rng + ?Sized>(
    source: ApiSource,
    map: &Map<String, Value>,
    rng: &mut R,
) -> Rating {
    let (rate, count) = match map.get("rating") {
        Some(Value::Object(rating)) => (
            rating.get("rate").and_then(Value::as_f64),
            rating.get("count").and_then(Value::as_u64),
        ),
        Some(Value::Number(n)) => (n.as_f64(), None),
        _ => (None, None),
    };

    let rate = rate
        .filter(|r| *r > 0.0 && r.is_finite())
        .unwrap_or(DEFAULT_RATE)
        .clamp(0.0, MAX_RATE);

    let count = count
        .filter(|c| *c > 0)
        .or_else(|| match map.get("reviews") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::Array(reviews)) => u64::try_from(reviews.len()).ok(),
            _ => None,
        })
        .unwrap_or_else(|| match source {
            ApiSource::FakeStore => FAKESTORE_DEFAULT_COUNT,
            ApiSource::DummyJson | ApiSource::Synthetic => rng.random_range(0..1000),
        });

    Rating { rate, count }
}

fn parse_stock<R: Rng + ?Sized>(source: ApiSource, map: &Map<String, Value>, rng: &mut R) -> u32 {
    map.get("stock")
        .and_then(Value::as_u64)
        .filter(|s| *s > 0)
        .map(|s| u32::try_from(s).unwrap_or(u32::MAX))
        .unwrap_or_else(|| match source {
            ApiSource::FakeStore => rng.random_range(10..110),
            ApiSource::DummyJson | ApiSource::Synthetic => rng.random_range(0..100),
        })
}

fn pick_image(map: &Map<String, Value>) -> Option<String> {
    non_empty_str(map, "image")
        .or_else(|| non_empty_str(map, "thumbnail"))
        .or_else(|| {
            map.get("images")
                .and_then(Value::as_array)
                .and_then(|images| images.iter().find_map(Value::as_str))
                .filter(|s| !s.trim().is_empty())
        })
        .map(str::to_owned)
}
