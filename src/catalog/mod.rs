//! Product catalog data model.
//!
//! The catalog is a flat JSON file of product records created offline; the
//! search core treats it as read-only input. Brands and categories are
//! closed sets, so they are real enums rather than free strings: the wire
//! names below match the catalog file and the index payload exactly, and
//! the same names feed the agent's tool schema and instructions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Clothing brands carried by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Brand {
    Zara,
    #[serde(rename = "Levi's")]
    Levis,
    #[serde(rename = "H&M")]
    Hm,
    Uniqlo,
    Adidas,
}

impl Brand {
    /// Every brand, in catalog order.
    pub const ALL: [Brand; 5] = [Brand::Zara, Brand::Levis, Brand::Hm, Brand::Uniqlo, Brand::Adidas];

    /// Wire name as it appears in the catalog file and index payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Zara => "Zara",
            Brand::Levis => "Levi's",
            Brand::Hm => "H&M",
            Brand::Uniqlo => "Uniqlo",
            Brand::Adidas => "Adidas",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Brand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Brand::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidRequest(format!("unknown brand '{}'", s)))
    }
}

/// Clothing categories carried by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dresses,
    Pants,
    Shirts,
    Sweaters,
    #[serde(rename = "t-shirts")]
    TShirts,
    Skirts,
    Jackets,
}

impl Category {
    /// Every category, in catalog order.
    pub const ALL: [Category; 7] = [
        Category::Dresses,
        Category::Pants,
        Category::Shirts,
        Category::Sweaters,
        Category::TShirts,
        Category::Skirts,
        Category::Jackets,
    ];

    /// Wire name as it appears in the catalog file and index payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dresses => "dresses",
            Category::Pants => "pants",
            Category::Shirts => "shirts",
            Category::Sweaters => "sweaters",
            Category::TShirts => "t-shirts",
            Category::Skirts => "skirts",
            Category::Jackets => "jackets",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidRequest(format!("unknown category '{}'", s)))
    }
}

/// A single inventory item.
///
/// `id` is the stable join key between the catalog file and the index
/// payload; it must round-trip through ingestion unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub brand: Brand,
    pub price: f64,
    pub color: String,
    pub material: String,
    pub size: Vec<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Load the product catalog from a JSON file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Product>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Catalog(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::Catalog(format!("failed to parse {}: {}", path.display(), e)))
}
