//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Product ids are
//! special: they carry their [`ApiSource`] so that merged catalogs can never
//! collide.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::source::{ApiSource, SOURCE_ID_SPAN};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use bmart_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new(1);
/// let order_id = OrderId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);

/// Errors that can occur when building a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The source-local id does not fit in one source's id block.
    #[error("local product id {local} is outside 0..{max}")]
    LocalOutOfRange {
        /// The rejected local id.
        local: i64,
        /// Exclusive upper bound.
        max: i64,
    },
    /// The global id is not owned by any known source.
    #[error("product id {0} does not belong to any source")]
    UnknownRange(i64),
    /// The input is not an integer.
    #[error("product id must be an integer: {0}")]
    NotANumber(String),
}

/// A provenance-tagged product identifier.
///
/// Internally `(source, local id)`. The numeric form returned by
/// [`ProductId::global`] is what cart lines and page URLs use; it is
/// `source.offset() + local` and decodes back losslessly.
///
/// ```
/// use bmart_core::{ApiSource, ProductId};
///
/// let id = ProductId::new(ApiSource::DummyJson, 5).unwrap();
/// assert_eq!(id.global(), 1005);
/// assert_eq!(ProductId::try_from(1005).unwrap(), id);
/// assert!(ProductId::new(ApiSource::FakeStore, 1000).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ProductId {
    source: ApiSource,
    local: u32,
}

impl ProductId {
    /// Tag a source-local id.
    ///
    /// # Errors
    ///
    /// Returns [`ProductIdError::LocalOutOfRange`] if `local` is negative or
    /// does not fit in the source's id block.
    pub fn new(source: ApiSource, local: i64) -> Result<Self, ProductIdError> {
        if !(0..SOURCE_ID_SPAN).contains(&local) {
            return Err(ProductIdError::LocalOutOfRange {
                local,
                max: SOURCE_ID_SPAN,
            });
        }
        let local = u32::try_from(local).map_err(|_| ProductIdError::LocalOutOfRange {
            local,
            max: SOURCE_ID_SPAN,
        })?;
        Ok(Self { source, local })
    }

    /// The source this product came from.
    #[must_use]
    pub const fn source(&self) -> ApiSource {
        self.source
    }

    /// The id as assigned by the source.
    #[must_use]
    pub const fn local(&self) -> u32 {
        self.local
    }

    /// The catalog-wide numeric id.
    #[must_use]
    pub fn global(&self) -> i64 {
        self.source.offset() + i64::from(self.local)
    }
}

impl TryFrom<i64> for ProductId {
    type Error = ProductIdError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        let source = ApiSource::for_global_id(id).ok_or(ProductIdError::UnknownRange(id))?;
        Self::new(source, id - source.offset())
    }
}

impl From<ProductId> for i64 {
    fn from(id: ProductId) -> Self {
        id.global()
    }
}

impl FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| ProductIdError::NotANumber(s.to_owned()))?;
        Self::try_from(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.global())
    }
}
