//! Cache entry and request identity types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Normalized identity of a cacheable request.
///
/// Method plus absolute URL with the fragment stripped, hashed with
/// SHA-256 for a stable, fixed-length key. Only GET requests ever get
/// this far, but the method is part of the identity regardless.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
  pub fn new(method: &str, url: &Url) -> Self {
    let mut normalized = url.clone();
    normalized.set_fragment(None);

    let input = format!("{} {}", method.to_uppercase(), normalized);
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    RequestKey(hex::encode(hasher.finalize()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

/// A cached response: body bytes plus headers, with the origin
/// timestamp used for staleness checks. At most one entry exists per
/// key per cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
  /// The request URL, kept readable for diagnostics and statistics.
  pub url: String,
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
  pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
  /// Age of this entry relative to now.
  pub fn age(&self) -> Duration {
    Utc::now() - self.stored_at
  }
}
