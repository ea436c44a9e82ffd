use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub catalog: CatalogConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  /// Custom title for the header (defaults to the shop host if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
  /// Base URL of the shop, e.g. `https://shop.example/`
  pub url: String,
  /// Path of the catalog data document relative to the base URL
  #[serde(default = "default_catalog_path")]
  pub path: String,
}

fn default_catalog_path() -> String {
  "products.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Version embedded in the cache generation name. Changing it
  /// invalidates every previously cached entry on activation.
  #[serde(default = "default_cache_version")]
  pub version: String,
  /// Seconds the document strategy races the network before falling
  /// back to cache
  #[serde(default = "default_document_timeout")]
  pub document_timeout_secs: u64,
  /// Hours before a cached static asset gets a background refresh
  #[serde(default = "default_refresh_hours")]
  pub refresh_hours: i64,
  /// Paths (relative to the base URL) fetched up front on install
  #[serde(default)]
  pub precache: Vec<String>,
  /// Extra path patterns excluded from caching
  #[serde(default)]
  pub exclude: Vec<String>,
  /// Local HTML file served when a document is unreachable
  #[serde(default)]
  pub offline_page: Option<PathBuf>,
  /// Local image file served when an image is unreachable
  #[serde(default)]
  pub placeholder_image: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      version: default_cache_version(),
      document_timeout_secs: default_document_timeout(),
      refresh_hours: default_refresh_hours(),
      precache: Vec::new(),
      exclude: Vec::new(),
      offline_page: None,
      placeholder_image: None,
    }
  }
}

fn default_cache_version() -> String {
  env!("CARGO_PKG_VERSION").to_string()
}

fn default_document_timeout() -> u64 {
  5
}

fn default_refresh_hours() -> i64 {
  24
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./ortocat.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/ortocat/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/ortocat/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("ortocat.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("ortocat").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// The shop root as a parsed URL.
  pub fn site_root(&self) -> Result<Url> {
    Url::parse(&self.catalog.url)
      .map_err(|e| eyre!("Invalid catalog url {}: {}", self.catalog.url, e))
  }

  /// Absolute URL of the catalog data document.
  pub fn catalog_url(&self) -> Result<Url> {
    self
      .site_root()?
      .join(&self.catalog.path)
      .map_err(|e| eyre!("Invalid catalog path {}: {}", self.catalog.path, e))
  }

  /// Title shown in the header.
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    self
      .site_root()
      .ok()
      .and_then(|url| url.host_str().map(String::from))
      .unwrap_or_else(|| "ortocat".to_string())
  }
}
