//! Faceted discovery over the Business → Project → Task catalog.
//!
//! Everything below `handlers` is pure: it takes a catalog plus criteria and
//! returns derived views without touching I/O.

pub mod diagnostics;
pub mod facets;
pub mod filter;
pub mod handlers;
pub mod skills;
pub mod snapshot;
pub mod stats;

pub use filter::{filter_catalog, FilterInput, Stage};
pub use snapshot::{CatalogSnapshot, FilterOutcome};
