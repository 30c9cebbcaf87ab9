//! Handler registrations for the sample catalog.
//!
//! This is the embedding side of the bridge contract: plain functions over
//! the catalog, registered by name.  Argument validation happens here, at
//! the boundary — the bridge itself never inspects handler data.

use std::sync::Arc;

use anyhow::anyhow;
use serde_json::{json, Value};

use jsbridge_host::{HandlerArgs, HandlerRegistry};

use crate::catalog::ProductCatalog;

/// Builds the registry the demo dispatcher routes through.
pub fn build_registry(catalog: Arc<ProductCatalog>) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    let all = Arc::clone(&catalog);
    registry.register("getAllProducts", move |_args: HandlerArgs| {
        Ok(json!(all.products()))
    });

    registry.register("getProduct", move |args: HandlerArgs| {
        // Script callers pass the name as the first element of an array.
        let name = args
            .positional(0)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("getProduct requires a product name argument"))?;
        match catalog.product_by_name(name) {
            Some(product) => Ok(json!(product)),
            None => Ok(Value::Null),
        }
    });

    registry
}

// ── Tests ─────────────────────────────────────────────────────────────────────
