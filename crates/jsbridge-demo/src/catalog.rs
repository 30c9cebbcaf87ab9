//! Sample in-memory product catalog.
//!
//! Stands in for whatever data layer a real embedding would expose through
//! the bridge.  Product lookups are case-insensitive, matching the handler
//! name convention, so script code can ask for `"apple"` or `"Apple"`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One catalog entry, serialized camelCase for the script side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Display name, also the lookup key.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Days until the product expires, counted from today.
    pub shelf_life_days: u32,
    /// Available sizes.
    pub sizes: Vec<String>,
}

/// Fixed sample inventory.
pub struct ProductCatalog {
    products: HashMap<String, Product>,
}

impl ProductCatalog {
    /// Builds the sample inventory.
    pub fn new() -> Self {
        let mut products = HashMap::new();
        for product in [
            Product {
                name: "Apple".to_string(),
                price: 3.99,
                shelf_life_days: 3,
                sizes: vec!["Small".to_string(), "Medium".to_string(), "Large".to_string()],
            },
            Product {
                name: "Pear".to_string(),
                price: 2.29,
                shelf_life_days: 7,
                sizes: vec!["Small".to_string(), "Large".to_string()],
            },
        ] {
            products.insert(product.name.to_ascii_lowercase(), product);
        }
        Self { products }
    }

    /// Every product, ordered by name for stable output.
    pub fn products(&self) -> Vec<Product> {
        let mut all: Vec<Product> = self.products.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Finds one product by name, ignoring case.
    pub fn product_by_name(&self, name: &str) -> Option<Product> {
        self.products.get(&name.to_ascii_lowercase()).cloned()
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
