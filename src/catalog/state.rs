//! Catalog browsing state.
//!
//! All filter, search, sort, and view changes go through the transition
//! methods here; each transition recomputes the derived product list
//! through the query engine instead of mutating it in place.

use serde::{Deserialize, Serialize};

use super::engine::filter_products;
use super::types::{Category, CategoryFilter, Product, SortKey};

/// How the product list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
  #[default]
  Grid,
  List,
}

impl ViewMode {
  pub fn toggled(self) -> Self {
    match self {
      ViewMode::Grid => ViewMode::List,
      ViewMode::List => ViewMode::Grid,
    }
  }
}

/// Browsing state owned by the application shell.
#[derive(Debug, Default)]
pub struct CatalogState {
  products: Vec<Product>,
  filtered: Vec<Product>,
  category: CategoryFilter,
  search: String,
  sort: SortKey,
  view: ViewMode,
}

impl CatalogState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the full product list (one catalog load per session).
  pub fn set_products(&mut self, products: Vec<Product>) {
    self.products = products;
    self.recompute();
  }

  pub fn set_category(&mut self, category: CategoryFilter) {
    self.category = category;
    self.recompute();
  }

  /// Advance to the next category in navigation order (all → each
  /// category → back to all).
  pub fn cycle_category(&mut self) {
    let next = match self.category {
      CategoryFilter::All => CategoryFilter::Only(Category::ALL[0]),
      CategoryFilter::Only(current) => {
        let idx = Category::ALL.iter().position(|c| *c == current);
        match idx {
          Some(i) if i + 1 < Category::ALL.len() => CategoryFilter::Only(Category::ALL[i + 1]),
          _ => CategoryFilter::All,
        }
      }
    };
    self.set_category(next);
  }

  pub fn set_search(&mut self, query: impl Into<String>) {
    self.search = query.into();
    self.recompute();
  }

  pub fn set_sort(&mut self, sort: SortKey) {
    self.sort = sort;
    self.recompute();
  }

  /// Advance to the next sort order in menu order.
  pub fn cycle_sort(&mut self) {
    let idx = SortKey::ALL.iter().position(|s| *s == self.sort).unwrap_or(0);
    let next = SortKey::ALL[(idx + 1) % SortKey::ALL.len()];
    self.set_sort(next);
  }

  /// View mode has no effect on the derived list.
  pub fn set_view(&mut self, view: ViewMode) {
    self.view = view;
  }

  /// Back to all products, empty search, default order.
  pub fn reset_filters(&mut self) {
    self.category = CategoryFilter::All;
    self.search.clear();
    self.sort = SortKey::Default;
    self.recompute();
  }

  fn recompute(&mut self) {
    self.filtered = filter_products(&self.products, self.category, &self.search, self.sort);
  }

  pub fn products(&self) -> &[Product] {
    &self.products
  }

  pub fn filtered(&self) -> &[Product] {
    &self.filtered
  }

  pub fn category(&self) -> CategoryFilter {
    self.category
  }

  pub fn search(&self) -> &str {
    &self.search
  }

  pub fn sort(&self) -> SortKey {
    self.sort
  }

  pub fn view(&self) -> ViewMode {
    self.view
  }
}
