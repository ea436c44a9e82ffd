//! Catalog data model.
//!
//! Products are loaded once per session from a single JSON document and
//! are immutable afterwards. Filtered views are always recomputed, never
//! mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product category. The catalog uses a fixed, closed set of tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
  #[serde(rename = "щетки")]
  Brushes,
  #[serde(rename = "пасты")]
  Pastes,
  #[serde(rename = "ирригаторы")]
  Irrigators,
  #[serde(rename = "прочее")]
  Other,
}

impl Category {
  /// All categories, in the order they appear in the catalog navigation.
  pub const ALL: [Category; 4] = [
    Category::Brushes,
    Category::Pastes,
    Category::Irrigators,
    Category::Other,
  ];

  /// The raw tag as it appears in the catalog document.
  pub fn tag(&self) -> &'static str {
    match self {
      Category::Brushes => "щетки",
      Category::Pastes => "пасты",
      Category::Irrigators => "ирригаторы",
      Category::Other => "прочее",
    }
  }

  /// Human-readable label for display.
  pub fn label(&self) -> &'static str {
    match self {
      Category::Brushes => "Зубные щетки",
      Category::Pastes => "Зубные пасты",
      Category::Irrigators => "Ирригаторы",
      Category::Other => "Прочее",
    }
  }
}

/// Category filter. `All` is a query-time pseudo-value meaning no
/// category filter; it is not a real category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
  #[default]
  All,
  Only(Category),
}

impl CategoryFilter {
  /// Parse a filter from a raw tag. `"all"` and unknown tags mean no filter.
  pub fn from_tag(tag: &str) -> Self {
    Category::ALL
      .iter()
      .find(|c| c.tag() == tag)
      .map(|c| CategoryFilter::Only(*c))
      .unwrap_or(CategoryFilter::All)
  }

  pub fn label(&self) -> &'static str {
    match self {
      CategoryFilter::All => "Все товары",
      CategoryFilter::Only(c) => c.label(),
    }
  }
}

/// A single catalog product as shipped in the catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub id: u64,
  pub name: String,
  /// Minor-unit-free price in rubles.
  pub price: u64,
  pub category: Category,
  pub description: String,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default, rename = "isNew")]
  pub is_new: bool,
  /// Image path. Resolution and fallback are a rendering concern; the
  /// catalog carries the reference opaquely.
  #[serde(default)]
  pub image: String,
}

/// Sort order for the product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
  /// Most recently added first (descending id).
  #[default]
  Default,
  PriceAsc,
  PriceDesc,
  New,
  Name,
}

impl SortKey {
  /// Sort orders in the order the sort menu cycles through them.
  pub const ALL: [SortKey; 5] = [
    SortKey::Default,
    SortKey::PriceAsc,
    SortKey::PriceDesc,
    SortKey::New,
    SortKey::Name,
  ];

  /// Parse a sort key. Unrecognized values fall back to `Default`;
  /// this is policy, not an error.
  pub fn from_key(key: &str) -> Self {
    match key {
      "price-asc" => SortKey::PriceAsc,
      "price-desc" => SortKey::PriceDesc,
      "new" => SortKey::New,
      "name" => SortKey::Name,
      _ => SortKey::Default,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      SortKey::Default => "По умолчанию",
      SortKey::PriceAsc => "Сначала дешевле",
      SortKey::PriceDesc => "Сначала дороже",
      SortKey::New => "Сначала новинки",
      SortKey::Name => "По названию",
    }
  }
}

/// The catalog document: the single JSON resource the application loads.
///
/// The offline fallback synthesized by the cache router has the same
/// shape with an empty product list, so this type parses both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
  #[serde(default)]
  pub products: Vec<Product>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<DateTime<Utc>>,
}

/// Where catalog data came from, decoded from the router's
/// `x-data-source` response marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
  Network,
  Cache,
  Fallback,
}

impl DataSource {
  pub fn from_marker(marker: &str) -> Self {
    match marker {
      "cache" => DataSource::Cache,
      "fallback" => DataSource::Fallback,
      _ => DataSource::Network,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn product_parses_catalog_json() {
    let json = r#"{
      "id": 7,
      "name": "Ирригатор Aquajet LD-A8",
      "price": 4990,
      "category": "ирригаторы",
      "description": "Стационарный ирригатор для всей семьи",
      "features": ["4 насадки", "10 режимов"],
      "isNew": true,
      "image": "images/aquajet.webp"
    }"#;

    let product: Product = serde_json::from_str(json).unwrap();
    assert_eq!(product.id, 7);
    assert_eq!(product.category, Category::Irrigators);
    assert!(product.is_new);
    assert_eq!(product.features.len(), 2);
  }

  #[test]
  fn product_optional_fields_default() {
    let json = r#"{
      "id": 1,
      "name": "Зубная нить",
      "price": 150,
      "category": "прочее",
      "description": "Вощеная нить"
    }"#;

    let product: Product = serde_json::from_str(json).unwrap();
    assert!(!product.is_new);
    assert!(product.features.is_empty());
    assert!(product.image.is_empty());
  }

  #[test]
  fn category_filter_from_tag() {
    assert_eq!(CategoryFilter::from_tag("all"), CategoryFilter::All);
    assert_eq!(
      CategoryFilter::from_tag("пасты"),
      CategoryFilter::Only(Category::Pastes)
    );
    // Unknown tags mean no filter rather than an error
    assert_eq!(CategoryFilter::from_tag("чепуха"), CategoryFilter::All);
  }

  #[test]
  fn sort_key_falls_back_to_default() {
    assert_eq!(SortKey::from_key("price-asc"), SortKey::PriceAsc);
    assert_eq!(SortKey::from_key("popularity"), SortKey::Default);
    assert_eq!(SortKey::from_key(""), SortKey::Default);
  }

  #[test]
  fn empty_fallback_document_parses() {
    let json = r#"{
      "products": [],
      "message": "Офлайн режим: данные временно недоступны",
      "timestamp": "2025-06-01T12:00:00Z"
    }"#;

    let doc: CatalogDocument = serde_json::from_str(json).unwrap();
    assert!(doc.products.is_empty());
    assert!(doc.message.is_some());
    assert!(doc.timestamp.is_some());
  }
}
