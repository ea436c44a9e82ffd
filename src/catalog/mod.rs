//! Catalog domain: data model, pure query engine, browsing state, and
//! the router-backed catalog loader.

mod client;
mod engine;
mod state;
mod types;

pub use client::{CatalogClient, CatalogFetch};
pub use engine::filter_products;
pub use state::{CatalogState, ViewMode};
pub use types::{
  CatalogDocument, Category, CategoryFilter, DataSource, Product, SortKey,
};
