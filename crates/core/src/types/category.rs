//! Product categories.

use serde::{Deserialize, Serialize};

/// Fixed set of product categories for the catalog.
///
/// The public catalog can be filtered by one of these; the set is closed
/// and served verbatim by `GET /products/categories`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Vegetables,
    Fruits,
    Spices,
    Dairy,
    Grains,
    #[serde(rename = "Meat & Poultry")]
    MeatAndPoultry,
    Beverages,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Self; 7] = [
        Self::Vegetables,
        Self::Fruits,
        Self::Spices,
        Self::Dairy,
        Self::Grains,
        Self::MeatAndPoultry,
        Self::Beverages,
    ];

    /// Display name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vegetables => "Vegetables",
            Self::Fruits => "Fruits",
            Self::Spices => "Spices",
            Self::Dairy => "Dairy",
            Self::Grains => "Grains",
            Self::MeatAndPoultry => "Meat & Poultry",
            Self::Beverages => "Beverages",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}
