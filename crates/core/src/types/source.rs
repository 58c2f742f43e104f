//! Product provenance.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Width of the numeric id range owned by each source.
pub const SOURCE_ID_SPAN: i64 = 1000;

/// Where a catalog product came from.
///
/// Every source owns a disjoint block of the global numeric id space so that
/// ids stay unique after sources are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApiSource {
    /// fakestoreapi.com
    #[serde(rename = "fakestore")]
    FakeStore,
    /// dummyjson.com
    #[serde(rename = "dummyjson")]
    DummyJson,
    /// Locally generated placeholder data.
    #[serde(rename = "sample")]
    Synthetic,
}

impl ApiSource {
    /// All sources, ordered by id range.
    pub const ALL: [Self; 3] = [Self::FakeStore, Self::DummyJson, Self::Synthetic];

    /// First global id owned by this source.
    #[must_use]
    pub const fn offset(self) -> i64 {
        match self {
            Self::FakeStore => 0,
            Self::DummyJson => SOURCE_ID_SPAN,
            Self::Synthetic => 2 * SOURCE_ID_SPAN,
        }
    }

    /// Source owning the given global id, if any.
    #[must_use]
    pub fn for_global_id(id: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|source| (source.offset()..source.offset() + SOURCE_ID_SPAN).contains(&id))
    }

    /// Short machine name, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FakeStore => "fakestore",
            Self::DummyJson => "dummyjson",
            Self::Synthetic => "sample",
        }
    }
}

impl fmt::Display for ApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
