//! Catalog query engine.
//!
//! A pure reduction of the full product list into the list to display:
//! category filter, then search filter, then sort. No I/O, no state,
//! no error conditions. Every input combination produces a defined
//! ordering, and identical inputs always produce identical output.

use super::types::{CategoryFilter, Product, SortKey};

/// Reduce the full product list to the ordered list to display.
///
/// The input is never mutated; callers re-run this on every filter,
/// search, or sort change and replace their derived list wholesale.
pub fn filter_products(
  products: &[Product],
  category: CategoryFilter,
  search: &str,
  sort: SortKey,
) -> Vec<Product> {
  let mut result: Vec<Product> = products
    .iter()
    .filter(|p| matches_category(p, category))
    .filter(|p| matches_search(p, search))
    .cloned()
    .collect();

  sort_products(&mut result, sort);
  result
}

fn matches_category(product: &Product, filter: CategoryFilter) -> bool {
  match filter {
    CategoryFilter::All => true,
    CategoryFilter::Only(category) => product.category == category,
  }
}

/// Case-insensitive substring match against name, description, and any
/// feature entry. An empty or whitespace-only query keeps everything.
fn matches_search(product: &Product, query: &str) -> bool {
  let query = query.trim();
  if query.is_empty() {
    return true;
  }
  let query = query.to_lowercase();

  product.name.to_lowercase().contains(&query)
    || product.description.to_lowercase().contains(&query)
    || product
      .features
      .iter()
      .any(|f| f.to_lowercase().contains(&query))
}

/// Sort in place. All comparisons go through `sort_by`, which is
/// stable: products that compare equal keep their relative order from
/// the filtering step. That matters for `New`, which is a partial
/// order, not a total one.
fn sort_products(products: &mut [Product], sort: SortKey) {
  match sort {
    SortKey::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
    SortKey::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
    SortKey::New => products.sort_by(|a, b| b.is_new.cmp(&a.is_new)),
    // Ordinal codepoint comparison. For the catalog's working language
    // (Russian) this matches alphabet order; Ё does not occur in names.
    SortKey::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
    // Most recently added first
    SortKey::Default => products.sort_by(|a, b| b.id.cmp(&a.id)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::types::Category;

  fn product(id: u64, name: &str, price: u64, category: Category, is_new: bool) -> Product {
    Product {
      id,
      name: name.to_string(),
      price,
      category,
      description: String::new(),
      features: Vec::new(),
      is_new,
      image: String::new(),
    }
  }

  fn sample_catalog() -> Vec<Product> {
    vec![
      Product {
        description: "Мягкая щетка для чувствительных десен".to_string(),
        features: vec!["мягкая щетина".to_string()],
        ..product(1, "Щетка Curaprox CS 5460", 590, Category::Brushes, false)
      },
      Product {
        description: "Отбеливающая паста со фтором".to_string(),
        features: vec!["white".to_string(), "фтор".to_string()],
        ..product(2, "Паста Splat Professional", 320, Category::Pastes, true)
      },
      Product {
        description: "Портативный ирригатор".to_string(),
        features: vec!["аккумулятор".to_string()],
        ..product(3, "Ирригатор Revyline RL 450", 5490, Category::Irrigators, true)
      },
      Product {
        description: "Вощеная зубная нить".to_string(),
        ..product(4, "Нить Oral-B Essential", 180, Category::Other, false)
      },
    ]
  }

  fn ids(products: &[Product]) -> Vec<u64> {
    products.iter().map(|p| p.id).collect()
  }

  #[test]
  fn identical_inputs_give_identical_output() {
    let catalog = sample_catalog();
    let a = filter_products(&catalog, CategoryFilter::All, "щетка", SortKey::PriceAsc);
    let b = filter_products(&catalog, CategoryFilter::All, "щетка", SortKey::PriceAsc);
    assert_eq!(a, b);
  }

  #[test]
  fn input_is_not_mutated() {
    let catalog = sample_catalog();
    let before = catalog.clone();
    let _ = filter_products(&catalog, CategoryFilter::All, "", SortKey::Name);
    assert_eq!(catalog, before);
  }

  #[test]
  fn category_filter_keeps_only_matching() {
    let catalog = sample_catalog();
    let result = filter_products(
      &catalog,
      CategoryFilter::Only(Category::Pastes),
      "",
      SortKey::Default,
    );
    assert!(result.iter().all(|p| p.category == Category::Pastes));
    assert_eq!(ids(&result), vec![2]);
  }

  #[test]
  fn all_filter_keeps_everything() {
    let catalog = sample_catalog();
    let result = filter_products(&catalog, CategoryFilter::All, "", SortKey::Default);
    assert_eq!(result.len(), catalog.len());
  }

  #[test]
  fn search_matches_name_description_and_features() {
    let catalog = sample_catalog();

    // name
    let by_name = filter_products(&catalog, CategoryFilter::All, "curaprox", SortKey::Default);
    assert_eq!(ids(&by_name), vec![1]);

    // description
    let by_desc = filter_products(&catalog, CategoryFilter::All, "портативный", SortKey::Default);
    assert_eq!(ids(&by_desc), vec![3]);

    // feature entry
    let by_feature = filter_products(&catalog, CategoryFilter::All, "фтор", SortKey::Default);
    assert_eq!(ids(&by_feature), vec![2]);
  }

  #[test]
  fn search_is_case_insensitive_for_cyrillic() {
    let catalog = sample_catalog();
    let result = filter_products(&catalog, CategoryFilter::All, "ЩЕТКА", SortKey::Default);
    assert_eq!(ids(&result), vec![1]);
  }

  #[test]
  fn whitespace_query_is_a_noop() {
    let catalog = sample_catalog();
    let result = filter_products(&catalog, CategoryFilter::All, "   ", SortKey::Default);
    assert_eq!(result.len(), catalog.len());
  }

  #[test]
  fn search_trims_before_matching() {
    let catalog = sample_catalog();
    let result = filter_products(&catalog, CategoryFilter::All, "  нить  ", SortKey::Default);
    assert_eq!(ids(&result), vec![4]);
  }

  #[test]
  fn price_asc_is_monotonically_non_decreasing() {
    let catalog = sample_catalog();
    let result = filter_products(&catalog, CategoryFilter::All, "", SortKey::PriceAsc);
    assert!(result.windows(2).all(|w| w[0].price <= w[1].price));
  }

  #[test]
  fn price_desc_is_monotonically_non_increasing() {
    let catalog = sample_catalog();
    let result = filter_products(&catalog, CategoryFilter::All, "", SortKey::PriceDesc);
    assert!(result.windows(2).all(|w| w[0].price >= w[1].price));
  }

  #[test]
  fn new_sort_is_stable_within_equal_ranks() {
    let catalog = vec![
      product(10, "А", 100, Category::Other, false),
      product(11, "Б", 100, Category::Other, true),
      product(12, "В", 100, Category::Other, false),
      product(13, "Г", 100, Category::Other, true),
    ];

    let result = filter_products(&catalog, CategoryFilter::All, "", SortKey::New);
    // New products first, each group in its pre-sort order
    assert_eq!(ids(&result), vec![11, 13, 10, 12]);
  }

  #[test]
  fn default_sort_is_strictly_descending_by_id() {
    let catalog = sample_catalog();
    let result = filter_products(&catalog, CategoryFilter::All, "", SortKey::Default);
    assert!(result.windows(2).all(|w| w[0].id > w[1].id));
  }

  #[test]
  fn unrecognized_sort_key_uses_default_order() {
    let catalog = sample_catalog();
    let fallback = filter_products(
      &catalog,
      CategoryFilter::All,
      "",
      SortKey::from_key("rating"),
    );
    let default = filter_products(&catalog, CategoryFilter::All, "", SortKey::Default);
    assert_eq!(ids(&fallback), ids(&default));
  }

  // Two-product scenario covering sorting, category, and feature search
  // with Cyrillic data.
  #[test]
  fn combined_two_product_scenario() {
    let catalog = vec![
      Product {
        description: String::new(),
        ..product(1, "Б", 100, Category::Pastes, false)
      },
      Product {
        description: String::new(),
        features: vec!["white".to_string()],
        ..product(2, "А", 50, Category::Brushes, true)
      },
    ];

    let by_price = filter_products(&catalog, CategoryFilter::All, "", SortKey::PriceAsc);
    assert_eq!(ids(&by_price), vec![2, 1]);

    let by_name = filter_products(&catalog, CategoryFilter::All, "", SortKey::Name);
    assert_eq!(ids(&by_name), vec![2, 1]);

    let pastes = filter_products(
      &catalog,
      CategoryFilter::Only(Category::Pastes),
      "",
      SortKey::Default,
    );
    assert_eq!(ids(&pastes), vec![1]);

    let white = filter_products(&catalog, CategoryFilter::All, "white", SortKey::Default);
    assert_eq!(ids(&white), vec![2]);
  }
}
