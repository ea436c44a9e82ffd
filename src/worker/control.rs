//! Control channel types.
//!
//! The application sends typed commands to the router and receives a
//! small structured reply for each. Replies are serde types so they can
//! be logged or displayed without further shaping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::ContentKind;

/// Commands the application can send to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
  /// Report cache name and version.
  CacheInfo,
  /// Delete the current cache generation and re-run the precache.
  ClearCache,
  /// Check whether a newer application version is published.
  CheckUpdate,
  /// Force a catalog data sync now.
  SyncNow,
  /// Report entry counts per content kind.
  CacheStats,
}

/// Structured replies, one variant per command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ControlReply {
  CacheInfo {
    cache_name: String,
    version: String,
    timestamp: DateTime<Utc>,
  },
  ClearCache {
    success: bool,
    message: String,
  },
  CheckUpdate {
    has_update: bool,
  },
  SyncNow {
    success: bool,
  },
  CacheStats {
    cache_name: String,
    version: String,
    stats: CacheStats,
  },
}

/// Entry counts per content kind for one cache generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
  pub total: usize,
  pub html: usize,
  pub css: usize,
  pub js: usize,
  pub images: usize,
  pub fonts: usize,
  pub other: usize,
}

impl CacheStats {
  /// Bucket cached URLs by content kind.
  pub fn from_urls<'a>(urls: impl IntoIterator<Item = &'a str>) -> Self {
    let mut stats = CacheStats::default();
    for url in urls {
      let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());

      stats.total += 1;
      match ContentKind::from_path(&path) {
        ContentKind::Html => stats.html += 1,
        ContentKind::Stylesheet => stats.css += 1,
        ContentKind::Script => stats.js += 1,
        ContentKind::Image => stats.images += 1,
        ContentKind::Font => stats.fonts += 1,
        ContentKind::Other => stats.other += 1,
      }
    }
    stats
  }
}
