//! Sample reviews shown on product pages.
//!
//! Upstream sources do not expose review text consistently, so product pages
//! display generated reviews consistent with the product's rating.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

const MAX_REVIEWS: u64 = 6;
const REVIEW_WINDOW_DAYS: i64 = 30;

const AUTHORS: &[&str] = &[
    "John Doe",
    "Jane Smith",
    "Mike Johnson",
    "Sarah Wilson",
    "Alex Brown",
    "Emily Davis",
    "Chris Miller",
];

const COMMENTS: &[&str] = &[
    "Excellent product! Highly recommended for everyone.",
    "Good quality and fast delivery. Very satisfied with my purchase.",
    "Met my expectations perfectly. Will buy again in the future.",
    "Great value for money. Better than I expected!",
    "Would definitely buy again! Fast shipping and good packaging.",
    "Product is exactly as described. Very happy with the quality.",
    "Fast shipping and good packaging. Product works perfectly.",
    "Satisfied with the purchase. Good customer service too.",
    "Better than expected! The quality is outstanding.",
    "Good product for the price. Would recommend to friends.",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub author: String,
    /// 3.0-5.0
    pub rating: f64,
    pub comment: String,
    pub date: DateTime<Utc>,
}

/// Up to six reviews whose ratings scatter within half a star of `rating`,
/// clamped to 3-5, dated within the 30 days before `now`.
pub fn generate_sample_reviews<R: Rng + ?Sized>(
    rating: f64,
    count: u64,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<Review> {
    let window_secs = REVIEW_WINDOW_DAYS * 24 * 60 * 60;

    (0..count.min(MAX_REVIEWS))
        .map(|_| Review {
            author: (*AUTHORS.choose(rng).unwrap_or(&"John Doe")).to_owned(),
            rating: (rating + rng.random_range(-0.5..0.5)).clamp(3.0, 5.0),
            comment: (*COMMENTS.choose(rng).unwrap_or(&"Great value for money."))
                .to_owned(),
            date: now - Duration::seconds(rng.random_range(0..window_secs)),
        })
        .collect()
}
