//! jsbridge-demo library crate.
//!
//! The embedding application for the bridge: it owns the sample data, the
//! handler registrations, and nothing else.  The bridge crates never know
//! about products — they only see names, JSON arguments, and JSON results.
//!
//! Two handlers are exposed to script code, mirroring a minimal data API:
//!
//! - `getAllProducts` — no arguments, returns every product
//! - `getProduct` — one positional argument (the product name), returns the
//!   matching product or `null`

pub mod catalog;
pub mod handlers;

pub use catalog::{Product, ProductCatalog};
pub use handlers::build_registry;
