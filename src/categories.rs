//! Red List Category Weights
//!
//! Maps IUCN Red List category codes to integer severity weights
//! (Butchart et al., 2007). Data Deficient carries no weight; its true
//! status is imputed later by the bootstrap estimator.

use crate::error::{Result, RliError};

/// Code of the most severe category. Its weight is the normalisation
/// denominator of the index.
pub const EXTINCT: &str = "EX";

/// Code of the category with unknown extinction risk.
pub const DATA_DEFICIENT: &str = "DD";

/// A single category code with its weight (`None` for Data Deficient)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryWeight {
    pub code: &'static str,
    pub weight: Option<i64>,
}

static IUCN_CATEGORIES: &[CategoryWeight] = &[
    CategoryWeight { code: "LC", weight: Some(0) },
    CategoryWeight { code: "NT", weight: Some(1) },
    CategoryWeight { code: "VU", weight: Some(2) },
    CategoryWeight { code: "EN", weight: Some(3) },
    CategoryWeight { code: "CR", weight: Some(4) },
    CategoryWeight { code: "RE", weight: Some(5) },
    CategoryWeight { code: "CR(PE)", weight: Some(5) },
    CategoryWeight { code: "CR(PEW)", weight: Some(5) },
    CategoryWeight { code: "EW", weight: Some(5) },
    CategoryWeight { code: EXTINCT, weight: Some(5) },
    CategoryWeight { code: DATA_DEFICIENT, weight: None },
];

/// Lookup table from category code to weight
#[derive(Debug, Clone, Copy)]
pub struct CategoryWeightTable {
    entries: &'static [CategoryWeight],
    max_weight: i64,
}

impl Default for CategoryWeightTable {
    fn default() -> Self {
        Self::from_entries(IUCN_CATEGORIES)
    }
}

impl CategoryWeightTable {
    /// Build a table from a static category list.
    ///
    /// The maximum weight is the weight of `EX` when present, otherwise the
    /// largest weight in the list.
    pub fn from_entries(entries: &'static [CategoryWeight]) -> Self {
        let max_weight = entries
            .iter()
            .find(|c| c.code == EXTINCT)
            .and_then(|c| c.weight)
            .or_else(|| entries.iter().filter_map(|c| c.weight).max())
            .unwrap_or(0);

        Self { entries, max_weight }
    }

    /// Weight for a category code, `Ok(None)` for Data Deficient
    pub fn weight_of(&self, category: &str) -> Result<Option<i64>> {
        self.entries
            .iter()
            .find(|c| c.code == category)
            .map(|c| c.weight)
            .ok_or_else(|| RliError::InvalidCategory(category.to_string()))
    }

    pub fn max_weight(&self) -> i64 {
        self.max_weight
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.iter().any(|c| c.code == category)
    }

    /// Known category codes in table order
    pub fn codes(&self) -> Vec<&'static str> {
        self.entries.iter().map(|c| c.code).collect()
    }
}
