//! Storefront domain types.
//!
//! [`Product`] is the normalized catalog entry shared by every upstream
//! source. [`CartItem`] is the persisted cart line; it snapshots what the
//! shopper saw at add time and is not refreshed when the catalog reloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bmart_core::{ApiSource, Price, ProductId, round_cents};

/// Products with fewer units than this are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Deterministic placeholder image for a product id.
#[must_use]
pub fn placeholder_image(id: ProductId) -> String {
    format!("https://picsum.photos/300/200?random={}", id.global())
}

/// Average rating and number of ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average score, 0-5.
    pub rate: f64,
    /// Number of ratings.
    pub count: u64,
}

/// A normalized catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// List price before any discount.
    pub price: Decimal,
    pub category: String,
    pub image: String,
    pub rating: Rating,
    pub brand: String,
    pub stock: u32,
    pub is_sale: bool,
    /// Discount in percent (0-100), when the source carries one.
    pub discount_percentage: Option<f64>,
    pub api_source: ApiSource,
}

impl Product {
    /// Price after applying [`Product::discount_percentage`].
    ///
    /// Products without a positive discount sell at list price.
    #[must_use]
    pub fn sale_price(&self) -> Decimal {
        let list = Price::new(self.price);
        match self
            .discount_percentage
            .filter(|d| *d > 0.0)
            .and_then(|d| Decimal::try_from(d).ok())
        {
            Some(percent) => list.discounted(percent).amount,
            None => round_cents(self.price),
        }
    }

    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }

    #[must_use]
    pub fn placeholder_image(&self) -> String {
        placeholder_image(self.id)
    }
}

/// What the cart needs to know about a product at add time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartProduct {
    pub id: ProductId,
    pub title: String,
    pub unit_price: Decimal,
    pub image: String,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            unit_price: product.sale_price(),
            image: product.image.clone(),
        }
    }
}

/// One persisted cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Global product id.
    pub id: i64,
    pub title: String,
    /// Unit price captured when the line was created.
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order totals, each rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_price() {
        let mut product = fixtures::product(1, "Phone", "smartphones", Decimal::new(100, 0));
        assert_eq!(product.sale_price(), Decimal::new(100, 0));

        product.discount_percentage = Some(12.5);
        assert_eq!(product.sale_price(), Decimal::new(8750, 2));

        product.discount_percentage = Some(0.0);
        assert_eq!(product.sale_price(), Decimal::new(100, 0));
    }

    #[test]
    fn test_low_stock() {
        let mut product = fixtures::product(1, "Phone", "smartphones", Decimal::ONE);
        product.stock = 9;
        assert!(product.is_low_stock());
        product.stock = 10;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_cart_product_uses_sale_price() {
        let mut product = fixtures::product(3, "Laptop", "laptops", Decimal::new(1000, 0));
        product.discount_percentage = Some(10.0);
        let cart_product = CartProduct::from(&product);
        assert_eq!(cart_product.unit_price, Decimal::new(900, 0));
        assert_eq!(cart_product.id.global(), 3);
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        let id = ProductId::new(ApiSource::DummyJson, 4).unwrap();
        assert_eq!(
            placeholder_image(id),
            "https://picsum.photos/300/200?random=1004"
        );
    }

    #[test]
    fn test_product_json_shape() {
        let product = fixtures::product(7, "Ring", "jewelery", Decimal::new(1999, 2));
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["isSale"], false);
        assert_eq!(json["apiSource"], "fakestore");

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }
}
