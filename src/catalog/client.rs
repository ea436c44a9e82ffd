//! Catalog loading through the cache router.

use color_eyre::{eyre::eyre, Result};
use url::Url;

use crate::worker::{CacheRouter, Request};

use super::types::{CatalogDocument, DataSource};

/// Result of one catalog load: the parsed document plus where the data
/// actually came from.
#[derive(Debug, Clone)]
pub struct CatalogFetch {
  pub document: CatalogDocument,
  pub source: DataSource,
}

/// Loads the catalog data document via the router, so every load goes
/// through the stale-while-revalidate strategy.
#[derive(Clone)]
pub struct CatalogClient {
  router: CacheRouter,
  catalog_url: Url,
}

impl CatalogClient {
  pub fn new(router: CacheRouter, catalog_url: Url) -> Self {
    Self {
      router,
      catalog_url,
    }
  }

  /// Fetch and parse the catalog. The request carries cache-busting
  /// headers so intermediaries never serve it stale; offline freshness
  /// is the router's job, not theirs.
  ///
  /// The router guarantees parseable catalog data even with no network
  /// and no cache, so the only error here is a malformed document.
  pub async fn fetch_catalog(&self) -> Result<CatalogFetch> {
    let request = Request::get(self.catalog_url.clone())
      .with_header("cache-control", "no-cache")
      .with_header("x-requested-with", "XMLHttpRequest");

    let response = self.router.handle(&request).await;

    let document: CatalogDocument = serde_json::from_slice(&response.body)
      .map_err(|e| eyre!("Failed to parse catalog document: {}", e))?;

    let source = response
      .header("x-data-source")
      .map(DataSource::from_marker)
      .unwrap_or(DataSource::Network);

    Ok(CatalogFetch { document, source })
  }
}
