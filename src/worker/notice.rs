//! One-way notifications from the router to the application.

use chrono::{DateTime, Utc};

/// Fire-and-forget notices. Delivery is best effort: sends to a closed
/// channel are ignored, and there is no ordering guarantee across
/// notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerNotice {
  /// Precache finished for the given version.
  Installed { version: String },
  /// Old cache generations were purged; this version is now in control.
  Activated { version: String },
  /// Fresh catalog data landed in the cache.
  DataUpdated {
    count: usize,
    timestamp: DateTime<Utc>,
  },
  /// A background refresh overwrote cached resources.
  CacheUpdated { updated: usize },
}
