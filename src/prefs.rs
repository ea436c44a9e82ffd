//! Persisted user preferences and the local catalog snapshot.
//!
//! The core never interprets these; they carry the last selected theme
//! and view mode, plus a copy of the product list with its fetch
//! timestamp for when both the network and the cache router come up
//! empty. Stored as one JSON file in the data directory. Load failures
//! fall back to defaults; save failures are logged and ignored.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::{Product, ViewMode};
use crate::ui::theme::ThemeKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prefs {
  #[serde(default)]
  pub theme: ThemeKind,
  #[serde(default)]
  pub view: ViewMode,
  /// Last successfully loaded product list
  #[serde(default)]
  pub products: Vec<Product>,
  /// When the snapshot was fetched
  #[serde(default)]
  pub last_update: Option<DateTime<Utc>>,
}

impl Prefs {
  /// Load preferences from the default location, falling back to
  /// defaults on any error.
  pub fn load() -> Self {
    match Self::default_path().and_then(|path| Self::load_from(&path)) {
      Ok(prefs) => prefs,
      Err(e) => {
        debug!("using default preferences: {}", e);
        Prefs::default()
      }
    }
  }

  pub fn load_from(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read preferences {}: {}", path.display(), e))?;
    serde_json::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse preferences {}: {}", path.display(), e))
  }

  /// Save preferences to the default location.
  pub fn save(&self) -> Result<()> {
    self.save_to(&Self::default_path()?)
  }

  pub fn save_to(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create preferences directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(self)
      .map_err(|e| eyre!("Failed to serialize preferences: {}", e))?;
    std::fs::write(path, contents)
      .map_err(|e| eyre!("Failed to write preferences {}: {}", path.display(), e))?;

    Ok(())
  }

  /// Remember the latest product list for offline resilience.
  pub fn remember_snapshot(&mut self, products: &[Product]) {
    self.products = products.to_vec();
    self.last_update = Some(Utc::now());
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("ortocat").join("prefs.json"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Category;

  #[test]
  fn roundtrip_preserves_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");

    let mut prefs = Prefs {
      theme: ThemeKind::Light,
      view: ViewMode::List,
      ..Prefs::default()
    };
    prefs.remember_snapshot(&[Product {
      id: 1,
      name: "Щетка".to_string(),
      price: 590,
      category: Category::Brushes,
      description: String::new(),
      features: Vec::new(),
      is_new: false,
      image: String::new(),
    }]);

    prefs.save_to(&path).unwrap();
    let loaded = Prefs::load_from(&path).unwrap();

    assert_eq!(loaded.theme, ThemeKind::Light);
    assert_eq!(loaded.view, ViewMode::List);
    assert_eq!(loaded.products.len(), 1);
    assert!(loaded.last_update.is_some());
  }

  #[test]
  fn missing_file_is_an_error_for_load_from() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Prefs::load_from(&dir.path().join("nope.json")).is_err());
  }
}
