//! Filtering, search and sorting over a product slice.
//!
//! Everything here is pure: callers pass a snapshot from
//! [`CatalogStore::products`](super::CatalogStore::products) and get a new
//! vector back.

use core::cmp::Ordering;
use core::convert::Infallible;
use core::str::FromStr;

use bmart_core::ProductId;

use crate::types::Product;

/// Category term that matches every product.
pub const ALL_CATEGORIES: &str = "all";

/// Loose category match: case-insensitive, either string containing the
/// other.
///
/// A blank term or exactly `"all"` matches everything. A product without a
/// category only matches those. Other spellings such as `"ALL"` go through
/// the loose rule like any other term.
#[must_use]
pub fn category_matches(product_category: &str, term: &str) -> bool {
    if term == ALL_CATEGORIES {
        return true;
    }
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    let category = product_category.trim().to_lowercase();
    if category.is_empty() {
        return false;
    }
    category.contains(&term) || term.contains(&category)
}

/// Products whose category loosely matches `category`.
#[must_use]
pub fn filter_by_category(products: &[Product], category: &str) -> Vec<Product> {
    products
        .iter()
        .filter(|p| category_matches(&p.category, category))
        .cloned()
        .collect()
}

/// Case-insensitive substring search over title, description, category and
/// brand. A blank query returns every product.
#[must_use]
pub fn search(products: &[Product], query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.to_vec();
    }

    products
        .iter()
        .filter(|p| {
            [&p.title, &p.description, &p.category, &p.brand]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Product ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    PriceLow,
    PriceHigh,
    /// Highest rated first.
    Rating,
    /// Title, case-insensitive A-Z.
    Name,
    /// Input order.
    #[default]
    Relevance,
}

impl SortKey {
    /// Parse a sort key; unknown values fall back to [`SortKey::Relevance`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "rating" => Self::Rating,
            "name" => Self::Name,
            _ => Self::Relevance,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Name => "name",
            Self::Relevance => "relevance",
        }
    }
}

impl FromStr for SortKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Stable sort into a new vector.
#[must_use]
pub fn sort(products: &[Product], key: SortKey) -> Vec<Product> {
    let mut sorted = products.to_vec();
    let compare: fn(&Product, &Product) -> Ordering = match key {
        SortKey::PriceLow => |a, b| a.price.cmp(&b.price),
        SortKey::PriceHigh => |a, b| b.price.cmp(&a.price),
        SortKey::Rating => |a, b| b.rating.rate.total_cmp(&a.rating.rate),
        SortKey::Name => |a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Relevance => return sorted,
    };
    sorted.sort_by(compare);
    sorted
}

/// Look a product up by id.
#[must_use]
pub fn find_by_id(products: &[Product], id: ProductId) -> Option<&Product> {
    products.iter().find(|p| p.id == id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::fixtures::product;

    fn catalog() -> Vec<Product> {
        let mut items = vec![
            product(1, "Wireless Earbuds", "electronics", Decimal::new(5999, 2)),
            product(2, "Gold Ring", "jewelery", Decimal::new(19900, 2)),
            product(3, "Slim Fit Shirt", "men's clothing", Decimal::new(2250, 2)),
            product(4, "Gaming Laptop", "laptops", Decimal::new(129_900, 2)),
            product(5, "Budget Phone", "smartphones", Decimal::new(2250, 2)),
        ];
        items[0].rating.rate = 4.6;
        items[1].rating.rate = 3.1;
        items[3].brand = "Dell".to_owned();
        items
    }

    #[test]
    fn test_filter_all_and_blank() {
        let products = catalog();
        assert_eq!(filter_by_category(&products, "all").len(), 5);
        assert_eq!(filter_by_category(&products, "  ").len(), 5);
    }

    #[test]
    fn test_filter_loose_match() {
        let products = catalog();
        let titles = |items: Vec<Product>| items.into_iter().map(|p| p.title).collect::<Vec<_>>();

        assert_eq!(
            titles(filter_by_category(&products, "electronics")),
            vec!["Wireless Earbuds"]
        );
        // Term contained in category.
        assert_eq!(
            titles(filter_by_category(&products, "clothing")),
            vec!["Slim Fit Shirt"]
        );
        // Category contained in term.
        assert_eq!(
            titles(filter_by_category(&products, "Gaming Laptops")),
            vec!["Gaming Laptop"]
        );
        assert!(filter_by_category(&products, "furniture").is_empty());
    }

    #[test]
    fn test_all_sentinel_is_exact() {
        let products = catalog();
        assert_eq!(filter_by_category(&products, "all").len(), 5);
        assert!(filter_by_category(&products, "ALL").is_empty());
        assert!(filter_by_category(&products, " all ").is_empty());

        let mall = vec![product(9, "Food Court Voucher", "mall", Decimal::ONE)];
        assert_eq!(filter_by_category(&mall, "ALL").len(), 1);
    }

    #[test]
    fn test_empty_category_only_matches_all() {
        let products = vec![product(1, "Mystery Box", "", Decimal::ONE)];
        assert!(filter_by_category(&products, "electronics").is_empty());
        assert_eq!(filter_by_category(&products, "all").len(), 1);
    }

    #[test]
    fn test_search() {
        let products = catalog();
        assert_eq!(search(&products, "").len(), 5);
        assert_eq!(search(&products, "   ").len(), 5);
        assert!(search(&products, "zzz-no-match").is_empty());
        assert_eq!(search(&products, "  RING ").len(), 1);
        assert_eq!(search(&products, "dell").len(), 1);
        assert_eq!(search(&products, "about gold").len(), 1);
        assert_eq!(search(&products, "smartphones").len(), 1);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("price-low"), SortKey::PriceLow);
        assert_eq!(SortKey::parse("price-high"), SortKey::PriceHigh);
        assert_eq!(SortKey::parse("rating"), SortKey::Rating);
        assert_eq!(SortKey::parse("name"), SortKey::Name);
        assert_eq!(SortKey::parse("newest"), SortKey::Relevance);
        assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::Name);
        assert_eq!(SortKey::PriceHigh.as_str(), "price-high");
    }

    #[test]
    fn test_sort_price_is_stable() {
        let products = catalog();
        let ids = |items: Vec<Product>| items.iter().map(|p| p.id.global()).collect::<Vec<_>>();

        assert_eq!(ids(sort(&products, SortKey::PriceLow)), vec![3, 5, 1, 2, 4]);
        assert_eq!(ids(sort(&products, SortKey::PriceHigh)), vec![4, 2, 1, 3, 5]);
        assert_eq!(ids(sort(&products, SortKey::Relevance)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_sort_rating_and_name() {
        let products = catalog();
        let sorted = sort(&products, SortKey::Rating);
        assert_eq!(sorted.first().unwrap().title, "Wireless Earbuds");
        assert_eq!(sorted.last().unwrap().title, "Gold Ring");

        let sorted = sort(&products, SortKey::Name);
        assert_eq!(sorted.first().unwrap().title, "Budget Phone");
        assert_eq!(sorted.last().unwrap().title, "Wireless Earbuds");
    }

    #[test]
    fn test_find_by_id() {
        let products = catalog();
        let id = products[2].id;
        assert_eq!(find_by_id(&products, id).unwrap().title, "Slim Fit Shirt");
        let missing = ProductId::try_from(999).unwrap();
        assert!(find_by_id(&products, missing).is_none());
    }

    proptest! {
        #[test]
        fn price_sorts_are_monotonic_and_stable(cents in proptest::collection::vec(0i64..500, 0..40)) {
            let products: Vec<Product> = cents
                .iter()
                .enumerate()
                .map(|(i, c)| product(i64::try_from(i).unwrap(), &format!("item {i}"), "misc", Decimal::new(*c, 2)))
                .collect();

            let low = sort(&products, SortKey::PriceLow);
            prop_assert_eq!(low.len(), products.len());
            for pair in low.windows(2) {
                prop_assert!(pair[0].price <= pair[1].price);
                if pair[0].price == pair[1].price {
                    prop_assert!(pair[0].id < pair[1].id);
                }
            }

            let high = sort(&products, SortKey::PriceHigh);
            for pair in high.windows(2) {
                prop_assert!(pair[0].price >= pair[1].price);
                if pair[0].price == pair[1].price {
                    prop_assert!(pair[0].id < pair[1].id);
                }
            }
        }

        #[test]
        fn search_results_are_a_subset(query in "[a-z ]{0,6}") {
            let products = catalog();
            let found = search(&products, &query);
            prop_assert!(found.len() <= products.len());
            for p in &found {
                prop_assert!(products.contains(p));
            }
        }
    }
}
