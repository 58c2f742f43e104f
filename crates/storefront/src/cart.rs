//! Shopping cart persisted in key/value storage.
//!
//! Every mutation re-reads the stored cart first and writes it back after,
//! so two handles over the same storage see each other's changes.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use bmart_core::round_cents;

use crate::models::CurrentUser;
use crate::models::session::keys;
use crate::notify::{Notification, Notifier};
use crate::storage::{KeyValueStore, StorageError};
use crate::types::{CartItem, CartProduct, CartSummary};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cart serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please login to checkout")]
    LoginRequired,
}

fn free_shipping_above() -> Decimal {
    Decimal::new(5000, 2)
}

fn flat_shipping() -> Decimal {
    Decimal::new(599, 2)
}

fn tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// Totals for a set of cart lines.
///
/// Shipping is free above $50.00, otherwise $5.99 (also for an empty cart).
/// Tax is 8% of the subtotal. Every field is rounded to cents; the total is
/// computed before rounding.
#[must_use]
pub fn compute_summary(items: &[CartItem]) -> CartSummary {
    let subtotal: Decimal = items.iter().map(CartItem::line_total).sum();
    let shipping = if subtotal > free_shipping_above() {
        Decimal::ZERO
    } else {
        flat_shipping()
    };
    let tax = subtotal * tax_rate();
    let total = subtotal + shipping + tax;

    CartSummary {
        subtotal: round_cents(subtotal),
        shipping: round_cents(shipping),
        tax: round_cents(tax),
        total: round_cents(total),
    }
}

/// The shopping cart.
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Current cart lines. Unreadable or corrupt storage reads as empty.
    #[must_use]
    pub fn get_cart(&self) -> Vec<CartItem> {
        self.load_lines().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read cart");
            Vec::new()
        })
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.get_cart()
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] or [`CartError::Serialize`] if the
    /// cart cannot be read or written.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_to_cart(&self, product: &CartProduct) -> Result<(), CartError> {
        let mut lines = self.load_lines()?;
        let id = product.id.global();

        let message = if let Some(line) = lines.iter_mut().find(|line| line.id == id) {
            line.quantity = line.quantity.saturating_add(1);
            format!("Increased quantity of \"{}\"", product.title)
        } else {
            lines.push(CartItem {
                id,
                title: product.title.clone(),
                price: product.unit_price,
                image: product.image.clone(),
                quantity: 1,
            });
            format!("\"{}\" added to cart!", product.title)
        };

        self.save_lines(&lines)?;
        self.notifier.notify(Notification::success(message));
        Ok(())
    }

    /// Change a line's quantity by `delta`. A result below 1 removes the line;
    /// an unknown id is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] or [`CartError::Serialize`] if the
    /// cart cannot be read or written.
    #[instrument(skip(self))]
    pub fn update_quantity(&self, id: i64, delta: i64) -> Result<(), CartError> {
        let mut lines = self.load_lines()?;
        let Some(line) = lines.iter_mut().find(|line| line.id == id) else {
            return Ok(());
        };

        let quantity = i64::from(line.quantity).saturating_add(delta);
        if quantity < 1 {
            return self.remove_from_cart(id);
        }
        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        self.save_lines(&lines)
    }

    /// Drop the line for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] or [`CartError::Serialize`] if the
    /// cart cannot be read or written.
    #[instrument(skip(self))]
    pub fn remove_from_cart(&self, id: i64) -> Result<(), CartError> {
        let mut lines = self.load_lines()?;
        lines.retain(|line| line.id != id);
        self.save_lines(&lines)?;
        self.notifier.notify(Notification::info("Item removed from cart"));
        Ok(())
    }

    /// Totals for the current cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        compute_summary(&self.get_cart())
    }

    /// Place the order: requires a non-empty cart and a logged-in user.
    /// Clears the cart and returns the totals that were charged.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`], [`CartError::LoginRequired`], or a
    /// storage error.
    #[instrument(skip_all)]
    pub fn checkout(&self, session: Option<&CurrentUser>) -> Result<CartSummary, CartError> {
        let lines = self.load_lines()?;
        if lines.is_empty() {
            return Err(self.reject(CartError::EmptyCart));
        }
        let Some(user) = session else {
            return Err(self.reject(CartError::LoginRequired));
        };

        let summary = compute_summary(&lines);
        self.store.remove(keys::CART)?;

        info!(
            user_id = %user.id,
            lines = lines.len(),
            total = %summary.total,
            "Order placed"
        );
        self.notifier.notify(Notification::success(
            "Order placed successfully! Thank you for your purchase.",
        ));
        Ok(summary)
    }

    fn reject(&self, error: CartError) -> CartError {
        self.notifier.notify(Notification::error(error.to_string()));
        error
    }

    fn load_lines(&self) -> Result<Vec<CartItem>, CartError> {
        let Some(raw) = self.store.get(keys::CART)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(lines) => Ok(lines),
            Err(e) => {
                warn!(error = %e, "Stored cart is corrupt, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn save_lines(&self, lines: &[CartItem]) -> Result<(), CartError> {
        let json = serde_json::to_string(lines)?;
        self.store.set(keys::CART, &json)?;
        Ok(())
    }
}
