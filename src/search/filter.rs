//! Structured query filters and their Qdrant predicate form.

use qdrant_client::qdrant::{Condition, Filter, Range};
use serde::{Deserialize, Serialize};

use crate::catalog::{Brand, Category};

/// User-supplied structured constraints, every field independently optional.
///
/// An absent field imposes no constraint. Unknown keys in incoming JSON are
/// ignored, and `null` is equivalent to absent. `price_min > price_max` is
/// not rejected here: the range passes through to the index, which yields an
/// empty result set for an impossible range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<Brand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
}

impl ProductFilters {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.brand.is_none()
            && self.category.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
    }

    /// Build the Qdrant filter predicate: a conjunction with exactly one
    /// clause per present field.
    ///
    /// Returns `None` when every field is absent. The distinction matters:
    /// an absent filter means "match everything" to Qdrant, whereas an empty
    /// must-clause list is not a sentinel this crate ever sends.
    pub fn to_qdrant(&self) -> Option<Filter> {
        let mut conditions = Vec::new();

        if let Some(brand) = self.brand {
            conditions.push(Condition::matches("brand", brand.as_str().to_string()));
        }
        if let Some(category) = self.category {
            conditions.push(Condition::matches("category", category.as_str().to_string()));
        }
        if let Some(min) = self.price_min {
            conditions.push(Condition::range(
                "price",
                Range {
                    gte: Some(min),
                    ..Default::default()
                },
            ));
        }
        if let Some(max) = self.price_max {
            conditions.push(Condition::range(
                "price",
                Range {
                    lte: Some(max),
                    ..Default::default()
                },
            ));
        }

        if conditions.is_empty() {
            None
        } else {
            Some(Filter::must(conditions))
        }
    }
}
