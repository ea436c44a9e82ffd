//! Request routing with a distinct cache strategy per resource class.
//!
//! The router sits between the application and the network, backed by a
//! generation-namespaced cache store. Its `handle` entry point is
//! total: every request produces a response, never an error. Network
//! failures fall back to cache or synthesized content, and cache-store
//! failures degrade to network-only behavior for that request.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{CacheEntry, CacheStore};
use crate::config::Config;

use super::control::{CacheStats, ControlCommand, ControlReply};
use super::fallback::FallbackContent;
use super::fetch::NetworkFetcher;
use super::notice::WorkerNotice;
use super::request::{classify, ContentKind, Request, ResourceClass, Response};

/// Router settings, derived from the application configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
  /// Version string embedded in the cache generation name.
  pub version: String,
  /// Generation name prefix; the full name is `{prefix}v{version}`.
  pub cache_prefix: String,
  /// Site root, used for the root-document fallback and control URLs.
  pub site_root: Url,
  /// The catalog data document.
  pub catalog_url: Url,
  /// How long the document strategy races the network before falling
  /// back to cache.
  pub document_timeout: std::time::Duration,
  /// Cached static assets older than this get a background refresh.
  pub refresh_after: chrono::Duration,
  /// Resources fetched up front on install.
  pub precache: Vec<Url>,
  /// Extra exclusion patterns from configuration.
  pub exclusions: Vec<String>,
}

impl RouterConfig {
  pub fn from_config(config: &Config) -> Result<Self> {
    let site_root = config.site_root()?;
    let catalog_url = config.catalog_url()?;

    let precache = config
      .cache
      .precache
      .iter()
      .map(|path| {
        site_root
          .join(path)
          .map_err(|e| eyre!("Invalid precache entry {}: {}", path, e))
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(Self {
      version: config.cache.version.clone(),
      cache_prefix: "ortocat-cache-".to_string(),
      site_root,
      catalog_url,
      document_timeout: std::time::Duration::from_secs(config.cache.document_timeout_secs),
      refresh_after: chrono::Duration::hours(config.cache.refresh_hours),
      precache,
      exclusions: config.cache.exclude.clone(),
    })
  }

  pub fn cache_name(&self) -> String {
    format!("{}v{}", self.cache_prefix, self.version)
  }
}

/// The offline resource cache router.
#[derive(Clone)]
pub struct CacheRouter {
  store: Arc<dyn CacheStore>,
  fetcher: Arc<dyn NetworkFetcher>,
  fallback: FallbackContent,
  config: RouterConfig,
  notices: mpsc::UnboundedSender<WorkerNotice>,
}

impl CacheRouter {
  pub fn new(
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn NetworkFetcher>,
    fallback: FallbackContent,
    config: RouterConfig,
    notices: mpsc::UnboundedSender<WorkerNotice>,
  ) -> Self {
    Self {
      store,
      fetcher,
      fallback,
      config,
      notices,
    }
  }

  /// Best-effort precache of the configured resource list. Individual
  /// failures are skipped; install never fails as a whole.
  pub async fn install(&self) {
    self.precache_all().await;
    self.notify(WorkerNotice::Installed {
      version: self.config.version.clone(),
    });
  }

  /// Purge every cache generation that does not belong to the current
  /// version. This is the sole mass-invalidation mechanism.
  pub fn activate(&self) -> Result<()> {
    let current = self.config.cache_name();
    for name in self.store.generations(&self.config.cache_prefix)? {
      if name != current {
        info!(generation = %name, "removing old cache generation");
        self.store.delete_generation(&name)?;
      }
    }

    self.notify(WorkerNotice::Activated {
      version: self.config.version.clone(),
    });
    Ok(())
  }

  /// Route one request through the strategy for its class.
  pub async fn handle(&self, request: &Request) -> Response {
    match classify(request, &self.config.exclusions) {
      ResourceClass::Excluded => self.pass_through(request).await,
      ResourceClass::Document => self.handle_document(request).await,
      ResourceClass::StaticAsset => self.handle_static(request).await,
      ResourceClass::CatalogData => self.handle_catalog(request).await,
      ResourceClass::Other => self.handle_other(request).await,
    }
  }

  /// Force a catalog re-fetch and cache overwrite.
  pub async fn sync_catalog(&self) -> Result<usize> {
    let request = Request::get(self.config.catalog_url.clone())
      .with_header("cache-control", "no-cache");

    let response = self.fetcher.fetch(&request).await?;
    if !response.is_success() {
      return Err(eyre!("Catalog sync failed with status {}", response.status));
    }

    self.store_response(&request, &response);
    let count = count_products(&response.body);
    self.notify(WorkerNotice::DataUpdated {
      count,
      timestamp: Utc::now(),
    });

    Ok(count)
  }

  /// Execute a control command and produce its structured reply.
  pub async fn handle_command(&self, command: ControlCommand) -> ControlReply {
    match command {
      ControlCommand::CacheInfo => ControlReply::CacheInfo {
        cache_name: self.config.cache_name(),
        version: self.config.version.clone(),
        timestamp: Utc::now(),
      },
      ControlCommand::ClearCache => match self.store.delete_generation(&self.config.cache_name()) {
        Ok(()) => {
          self.precache_all().await;
          ControlReply::ClearCache {
            success: true,
            message: "Кэш очищен и пересоздан".to_string(),
          }
        }
        Err(e) => ControlReply::ClearCache {
          success: false,
          message: e.to_string(),
        },
      },
      ControlCommand::CheckUpdate => ControlReply::CheckUpdate {
        has_update: self.check_for_update().await,
      },
      ControlCommand::SyncNow => ControlReply::SyncNow {
        success: self.sync_catalog().await.is_ok(),
      },
      ControlCommand::CacheStats => {
        let stats = self
          .store
          .urls(&self.config.cache_name())
          .map(|urls| CacheStats::from_urls(urls.iter().map(String::as_str)))
          .unwrap_or_default();

        ControlReply::CacheStats {
          cache_name: self.config.cache_name(),
          version: self.config.version.clone(),
          stats,
        }
      }
    }
  }

  /// Excluded requests go straight to the network; the cache is never
  /// consulted or written. Network errors surface as a plain 503.
  async fn pass_through(&self, request: &Request) -> Response {
    match self.fetcher.fetch(request).await {
      Ok(response) => response,
      Err(e) => {
        debug!(url = %request.url, "pass-through fetch failed: {}", e);
        self.fallback.service_unavailable()
      }
    }
  }

  /// Network-first with timeout, then exact cache match, then the
  /// cached site root, then the offline document, then a synthesized
  /// minimal offline page.
  async fn handle_document(&self, request: &Request) -> Response {
    let fetch = self.fetcher.fetch(request);
    match tokio::time::timeout(self.config.document_timeout, fetch).await {
      Ok(Ok(response)) if response.is_success() => {
        self.store_response(request, &response);
        return response;
      }
      Ok(_) => debug!(url = %request.url, "document fetch failed, falling back to cache"),
      // The in-flight fetch is abandoned; its result is ignored
      Err(_) => debug!(url = %request.url, "document fetch timed out, falling back to cache"),
    }

    if let Some(entry) = self.cached(request) {
      return response_from(entry);
    }

    if request.url != self.config.site_root {
      let root = Request::document(self.config.site_root.clone());
      if let Some(entry) = self.cached(&root) {
        return response_from(entry);
      }
    }

    if let Some(response) = self.fallback.offline_page() {
      return response;
    }

    self.fallback.minimal_offline()
  }

  /// Cache-first. A hit is returned immediately; if the entry is older
  /// than the refresh threshold, a background task re-fetches it for
  /// the next read. A miss fetches from the network, and on failure
  /// synthesizes a typed fallback by content category.
  async fn handle_static(&self, request: &Request) -> Response {
    if let Some(entry) = self.cached(request) {
      if entry.age() > self.config.refresh_after {
        self.spawn_refresh(request.clone());
      }
      return response_from(entry);
    }

    match self.fetcher.fetch(request).await {
      Ok(response) if response.is_success() => {
        self.store_response(request, &response);
        response
      }
      _ => {
        debug!(url = %request.url, "static asset unavailable, synthesizing fallback");
        match ContentKind::from_path(request.url.path()) {
          ContentKind::Image => self.fallback.placeholder_image(),
          ContentKind::Stylesheet => self.fallback.empty_stylesheet(),
          ContentKind::Script => self.fallback.empty_script(),
          _ => self.fallback.not_found(),
        }
      }
    }
  }

  /// Stale-while-revalidate. A hit is returned immediately, marked with
  /// its data source, while a background fetch refreshes the entry for
  /// the next read. A miss waits for the network; total failure returns
  /// a synthesized empty catalog document, never an error.
  async fn handle_catalog(&self, request: &Request) -> Response {
    if let Some(entry) = self.cached(request) {
      self.spawn_revalidate(request.clone());

      let mut response = response_from(entry);
      response.set_header("x-data-source", "cache");
      response.set_header("x-cache-version", &self.config.version);
      response.set_header("x-cache-date", &Utc::now().to_rfc3339());
      return response;
    }

    match self.fetcher.fetch(request).await {
      Ok(mut response) if response.is_success() => {
        self.store_response(request, &response);
        response.set_header("x-data-source", "network");
        response.set_header("x-cache-version", &self.config.version);
        response
      }
      _ => {
        debug!(url = %request.url, "catalog unavailable, returning empty document");
        self.fallback.empty_catalog(&self.config.version)
      }
    }
  }

  /// Network-first, cache as fallback only. Successful responses are
  /// returned verbatim and never written to the cache.
  async fn handle_other(&self, request: &Request) -> Response {
    match self.fetcher.fetch(request).await {
      Ok(response) => response,
      Err(_) => {
        if let Some(entry) = self.cached(request) {
          return response_from(entry);
        }
        self.fallback.service_unavailable()
      }
    }
  }

  async fn precache_all(&self) {
    let tasks = self.config.precache.iter().cloned().map(|url| {
      let router = self.clone();
      async move {
        let request = Request::get(url);
        match router.fetcher.fetch(&request).await {
          Ok(response) if response.is_success() => {
            router.store_response(&request, &response);
            debug!(url = %request.url, "precached");
          }
          _ => debug!(url = %request.url, "precache skipped"),
        }
      }
    });

    futures::future::join_all(tasks).await;
  }

  async fn check_for_update(&self) -> bool {
    let url = match self.config.site_root.join("version.json") {
      Ok(url) => url,
      Err(_) => return false,
    };

    let request = Request::get(url).with_header("cache-control", "no-store");
    match self.fetcher.fetch(&request).await {
      Ok(response) if response.is_success() => {
        serde_json::from_slice::<serde_json::Value>(&response.body)
          .ok()
          .and_then(|value| {
            value["version"]
              .as_str()
              .map(|version| version != self.config.version)
          })
          .unwrap_or(false)
      }
      _ => false,
    }
  }

  /// Fire-and-forget refresh of a stale static asset. Failures are
  /// silently discarded; the next read will try again.
  fn spawn_refresh(&self, request: Request) {
    let router = self.clone();
    tokio::spawn(async move {
      if let Ok(response) = router.fetcher.fetch(&request).await {
        if response.is_success() {
          router.store_response(&request, &response);
          router.notify(WorkerNotice::CacheUpdated { updated: 1 });
        }
      }
    });
  }

  /// Fire-and-forget revalidation of the catalog document.
  fn spawn_revalidate(&self, request: Request) {
    let router = self.clone();
    tokio::spawn(async move {
      if let Ok(response) = router.fetcher.fetch(&request).await {
        if response.is_success() {
          router.store_response(&request, &response);
          let count = count_products(&response.body);
          router.notify(WorkerNotice::DataUpdated {
            count,
            timestamp: Utc::now(),
          });
        }
      }
    });
  }

  fn cached(&self, request: &Request) -> Option<CacheEntry> {
    match self.store.get(&self.config.cache_name(), &request.key()) {
      Ok(entry) => entry,
      Err(e) => {
        // Treat the store as empty for this operation
        warn!(url = %request.url, "cache read failed: {}", e);
        None
      }
    }
  }

  fn store_response(&self, request: &Request, response: &Response) {
    let entry = CacheEntry {
      url: request.url.to_string(),
      status: response.status,
      headers: response.headers.clone(),
      body: response.body.clone(),
      stored_at: Utc::now(),
    };

    if let Err(e) = self.store.put(&self.config.cache_name(), &request.key(), &entry) {
      // Entry not written; this request degrades to network-only
      warn!(url = %request.url, "cache write failed: {}", e);
    }
  }

  fn notify(&self, notice: WorkerNotice) {
    // Receiver may be gone; notices are best effort
    let _ = self.notices.send(notice);
  }
}

fn response_from(entry: CacheEntry) -> Response {
  Response {
    status: entry.status,
    headers: entry.headers,
    body: entry.body,
  }
}

fn count_products(body: &[u8]) -> usize {
  serde_json::from_slice::<serde_json::Value>(body)
    .ok()
    .and_then(|value| value["products"].as_array().map(Vec::len))
    .unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStore;
  use async_trait::async_trait;
  use std::collections::VecDeque;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;
  use std::time::{Duration, Instant};

  enum FetchOutcome {
    Respond(Response),
    Fail,
  }

  /// Fetcher that plays back a scripted sequence of outcomes; once the
  /// script runs out, every fetch fails.
  struct ScriptedFetcher {
    script: Mutex<VecDeque<FetchOutcome>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
  }

  impl ScriptedFetcher {
    fn new(script: Vec<FetchOutcome>) -> Self {
      Self {
        script: Mutex::new(script.into()),
        delay: None,
        calls: AtomicUsize::new(0),
      }
    }

    fn failing() -> Self {
      Self::new(Vec::new())
    }

    fn respond_with(response: Response) -> Self {
      Self::new(vec![FetchOutcome::Respond(response)])
    }

    fn with_delay(mut self, delay: Duration) -> Self {
      self.delay = Some(delay);
      self
    }

    fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }
  }

  #[async_trait]
  impl NetworkFetcher for ScriptedFetcher {
    async fn fetch(&self, _request: &Request) -> Result<Response> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }

      let outcome = self.script.lock().unwrap().pop_front();
      match outcome {
        Some(FetchOutcome::Respond(response)) => Ok(response),
        _ => Err(eyre!("network unreachable")),
      }
    }
  }

  fn test_config() -> RouterConfig {
    RouterConfig {
      version: "2.1".to_string(),
      cache_prefix: "ortocat-cache-".to_string(),
      site_root: Url::parse("https://shop.example/").unwrap(),
      catalog_url: Url::parse("https://shop.example/products.json").unwrap(),
      document_timeout: Duration::from_millis(100),
      refresh_after: chrono::Duration::hours(24),
      precache: Vec::new(),
      exclusions: Vec::new(),
    }
  }

  struct TestRouter {
    router: CacheRouter,
    store: Arc<MemoryStore>,
    notices: mpsc::UnboundedReceiver<WorkerNotice>,
  }

  fn test_router(fetcher: Arc<ScriptedFetcher>) -> TestRouter {
    test_router_with(fetcher, test_config(), FallbackContent::default())
  }

  fn test_router_with(
    fetcher: Arc<ScriptedFetcher>,
    config: RouterConfig,
    fallback: FallbackContent,
  ) -> TestRouter {
    let store = Arc::new(MemoryStore::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let router = CacheRouter::new(store.clone(), fetcher, fallback, config, tx);
    TestRouter {
      router,
      store,
      notices: rx,
    }
  }

  fn seed_entry(store: &MemoryStore, cache_name: &str, request: &Request, body: &[u8], age_hours: i64) {
    let entry = CacheEntry {
      url: request.url.to_string(),
      status: 200,
      headers: vec![("content-type".to_string(), "text/plain".to_string())],
      body: body.to_vec(),
      stored_at: Utc::now() - chrono::Duration::hours(age_hours),
    };
    store.put(cache_name, &request.key(), &entry).unwrap();
  }

  fn document_request(path: &str) -> Request {
    Request::document(Url::parse(&format!("https://shop.example{}", path)).unwrap())
  }

  fn catalog_request() -> Request {
    Request::get(Url::parse("https://shop.example/products.json").unwrap())
  }

  // Document strategy

  #[tokio::test]
  async fn document_success_is_cached_and_returned() {
    let fetcher = Arc::new(ScriptedFetcher::respond_with(
      Response::new(200).with_body("text/html", "<html>fresh</html>"),
    ));
    let t = test_router(fetcher);

    let request = document_request("/catalog");
    let response = t.router.handle(&request).await;
    assert_eq!(response.body, b"<html>fresh</html>");

    let cached = t.store.get("ortocat-cache-v2.1", &request.key()).unwrap();
    assert_eq!(cached.unwrap().body, b"<html>fresh</html>");
  }

  #[tokio::test]
  async fn document_timeout_falls_back_to_cache() {
    let fetcher = Arc::new(
      ScriptedFetcher::respond_with(Response::new(200).with_body("text/html", "<html>slow</html>"))
        .with_delay(Duration::from_millis(400)),
    );
    let t = test_router(fetcher);

    let request = document_request("/catalog");
    seed_entry(&t.store, "ortocat-cache-v2.1", &request, b"<html>cached</html>", 1);

    let response = t.router.handle(&request).await;
    assert_eq!(response.body, b"<html>cached</html>");
  }

  #[tokio::test]
  async fn document_falls_back_to_cached_site_root() {
    let fetcher = Arc::new(ScriptedFetcher::failing());
    let t = test_router(fetcher);

    let root = document_request("/");
    seed_entry(&t.store, "ortocat-cache-v2.1", &root, b"<html>root</html>", 1);

    let response = t.router.handle(&document_request("/deep/page")).await;
    assert_eq!(response.body, b"<html>root</html>");
  }

  #[tokio::test]
  async fn document_uses_configured_offline_page() {
    let fetcher = Arc::new(ScriptedFetcher::failing());
    let fallback = FallbackContent::new(Some(b"<h1>offline</h1>".to_vec()), None);
    let t = test_router_with(fetcher, test_config(), fallback);

    let response = t.router.handle(&document_request("/catalog")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, b"<h1>offline</h1>");
  }

  #[tokio::test]
  async fn document_with_nothing_at_all_synthesizes_offline_page() {
    let fetcher = Arc::new(ScriptedFetcher::failing());
    let t = test_router(fetcher);

    let response = t.router.handle(&document_request("/catalog")).await;
    assert_eq!(response.status, 503);
    assert!(response.header("content-type").unwrap().starts_with("text/html"));
    assert!(!response.body.is_empty());
  }

  // Static asset strategy

  #[tokio::test]
  async fn static_miss_fetches_and_caches() {
    let fetcher = Arc::new(ScriptedFetcher::respond_with(
      Response::new(200).with_body("text/css", "body{}"),
    ));
    let t = test_router(fetcher.clone());

    let request = Request::get(Url::parse("https://shop.example/style.css").unwrap());
    let response = t.router.handle(&request).await;
    assert_eq!(response.body, b"body{}");

    // Fresh entry: second read comes from cache without touching the network
    let response = t.router.handle(&request).await;
    assert_eq!(response.body, b"body{}");
    assert_eq!(fetcher.calls(), 1);
  }

  #[tokio::test]
  async fn static_fallbacks_are_typed_by_content() {
    let t = test_router(Arc::new(ScriptedFetcher::failing()));

    let image = Request::get(Url::parse("https://shop.example/images/brush.webp").unwrap());
    assert_eq!(
      t.router.handle(&image).await.header("content-type"),
      Some("image/svg+xml")
    );

    let css = Request::get(Url::parse("https://shop.example/style.css").unwrap());
    assert_eq!(
      t.router.handle(&css).await.header("content-type"),
      Some("text/css")
    );

    let js = Request::get(Url::parse("https://shop.example/js/app.js").unwrap());
    assert_eq!(
      t.router.handle(&js).await.header("content-type"),
      Some("application/javascript")
    );

    let font = Request::get(Url::parse("https://shop.example/fonts/manrope.woff2").unwrap());
    assert_eq!(t.router.handle(&font).await.status, 404);
  }

  #[tokio::test]
  async fn stale_static_asset_is_served_before_refresh_resolves() {
    let fetcher = Arc::new(
      ScriptedFetcher::respond_with(Response::new(200).with_body("text/css", "body{new}"))
        .with_delay(Duration::from_millis(150)),
    );
    let mut t = test_router(fetcher);

    let request = Request::get(Url::parse("https://shop.example/style.css").unwrap());
    seed_entry(&t.store, "ortocat-cache-v2.1", &request, b"body{old}", 48);

    let started = Instant::now();
    let response = t.router.handle(&request).await;

    // The stale entry comes back immediately; the refresh is still in flight
    assert_eq!(response.body, b"body{old}");
    assert!(started.elapsed() < Duration::from_millis(100));

    // Once the background refresh lands, the entry is overwritten
    assert_eq!(
      t.notices.recv().await,
      Some(WorkerNotice::CacheUpdated { updated: 1 })
    );
    let cached = t.store.get("ortocat-cache-v2.1", &request.key()).unwrap().unwrap();
    assert_eq!(cached.body, b"body{new}");
  }

  #[tokio::test]
  async fn fresh_static_asset_does_not_trigger_refresh() {
    let fetcher = Arc::new(ScriptedFetcher::failing());
    let t = test_router(fetcher.clone());

    let request = Request::get(Url::parse("https://shop.example/style.css").unwrap());
    seed_entry(&t.store, "ortocat-cache-v2.1", &request, b"body{}", 1);

    let _ = t.router.handle(&request).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fetcher.calls(), 0);
  }

  // Catalog data strategy

  #[tokio::test]
  async fn catalog_miss_waits_for_network_and_marks_source() {
    let fetcher = Arc::new(ScriptedFetcher::respond_with(
      Response::new(200).with_body("application/json", r#"{"products":[{"id":1}]}"#),
    ));
    let t = test_router(fetcher);

    let response = t.router.handle(&catalog_request()).await;
    assert_eq!(response.header("x-data-source"), Some("network"));

    let cached = t.store.get("ortocat-cache-v2.1", &catalog_request().key()).unwrap();
    assert!(cached.is_some());
  }

  #[tokio::test]
  async fn catalog_hit_revalidates_in_background() {
    let fetcher = Arc::new(ScriptedFetcher::respond_with(
      Response::new(200).with_body("application/json", r#"{"products":[{"id":1},{"id":2}]}"#),
    ));
    let mut t = test_router(fetcher);

    let request = catalog_request();
    seed_entry(&t.store, "ortocat-cache-v2.1", &request, br#"{"products":[]}"#, 1);

    let response = t.router.handle(&request).await;
    assert_eq!(response.header("x-data-source"), Some("cache"));
    assert_eq!(response.body, br#"{"products":[]}"#);

    match t.notices.recv().await {
      Some(WorkerNotice::DataUpdated { count, .. }) => assert_eq!(count, 2),
      other => panic!("expected DataUpdated, got {:?}", other),
    }

    let cached = t.store.get("ortocat-cache-v2.1", &request.key()).unwrap().unwrap();
    assert_eq!(cached.body, br#"{"products":[{"id":1},{"id":2}]}"#.to_vec());
  }

  #[tokio::test]
  async fn catalog_total_failure_returns_parseable_empty_document() {
    let t = test_router(Arc::new(ScriptedFetcher::failing()));

    let response = t.router.handle(&catalog_request()).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.header("x-data-source"), Some("fallback"));

    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert!(value["products"].as_array().unwrap().is_empty());
    assert!(!value["message"].as_str().unwrap().is_empty());
    assert!(chrono::DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).is_ok());
  }

  // Default strategy

  #[tokio::test]
  async fn other_requests_fall_back_to_cache_then_503() {
    let t = test_router(Arc::new(ScriptedFetcher::failing()));

    let request = Request::get(Url::parse("https://shop.example/manifest.json").unwrap());
    seed_entry(&t.store, "ortocat-cache-v2.1", &request, b"{}", 1);
    assert_eq!(t.router.handle(&request).await.body, b"{}");

    let uncached = Request::get(Url::parse("https://shop.example/robots.txt").unwrap());
    assert_eq!(t.router.handle(&uncached).await.status, 503);
  }

  #[tokio::test]
  async fn other_requests_are_never_written_to_cache() {
    let fetcher = Arc::new(ScriptedFetcher::respond_with(
      Response::new(200).with_body("application/json", "{}"),
    ));
    let t = test_router(fetcher);

    let request = Request::get(Url::parse("https://shop.example/manifest.json").unwrap());
    let _ = t.router.handle(&request).await;

    assert!(t.store.get("ortocat-cache-v2.1", &request.key()).unwrap().is_none());
  }

  // Excluded requests

  #[tokio::test]
  async fn excluded_requests_bypass_the_cache_entirely() {
    let fetcher = Arc::new(ScriptedFetcher::respond_with(
      Response::new(200).with_body("application/json", "[]"),
    ));
    let t = test_router(fetcher);

    let request = Request::get(Url::parse("https://shop.example/api/orders").unwrap());
    let response = t.router.handle(&request).await;
    assert_eq!(response.status, 200);
    assert!(t.store.get("ortocat-cache-v2.1", &request.key()).unwrap().is_none());
  }

  // Lifecycle

  #[tokio::test]
  async fn activation_purges_other_generations() {
    let mut t = test_router(Arc::new(ScriptedFetcher::failing()));

    let request = catalog_request();
    seed_entry(&t.store, "ortocat-cache-v2.0", &request, b"old", 1);
    seed_entry(&t.store, "ortocat-cache-v2.1", &request, b"current", 1);

    t.router.activate().unwrap();

    assert!(t.store.get("ortocat-cache-v2.0", &request.key()).unwrap().is_none());
    assert!(t.store.get("ortocat-cache-v2.1", &request.key()).unwrap().is_some());
    assert_eq!(
      t.notices.recv().await,
      Some(WorkerNotice::Activated {
        version: "2.1".to_string()
      })
    );
  }

  #[tokio::test]
  async fn entries_from_previous_generation_are_not_served_after_activation() {
    let t = test_router(Arc::new(ScriptedFetcher::failing()));

    let request = catalog_request();
    seed_entry(&t.store, "ortocat-cache-v2.0", &request, br#"{"products":[{"id":9}]}"#, 1);

    t.router.activate().unwrap();

    // No current-generation entry and no network: synthesized fallback,
    // not the stale generation's data
    let response = t.router.handle(&request).await;
    assert_eq!(response.header("x-data-source"), Some("fallback"));
  }

  #[tokio::test]
  async fn install_precaches_best_effort() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
      FetchOutcome::Respond(Response::new(200).with_body("text/html", "<html>")),
      FetchOutcome::Fail,
    ]));

    let mut config = test_config();
    config.precache = vec![
      Url::parse("https://shop.example/").unwrap(),
      Url::parse("https://shop.example/style.css").unwrap(),
    ];
    let mut t = test_router_with(fetcher, config, FallbackContent::default());

    t.router.install().await;

    assert_eq!(
      t.notices.recv().await,
      Some(WorkerNotice::Installed {
        version: "2.1".to_string()
      })
    );
    // One resource cached, the failed one skipped
    assert_eq!(t.store.urls("ortocat-cache-v2.1").unwrap().len(), 1);
  }

  // Control channel

  #[tokio::test]
  async fn cache_stats_bucket_cached_entries() {
    let t = test_router(Arc::new(ScriptedFetcher::failing()));

    let css = Request::get(Url::parse("https://shop.example/style.css").unwrap());
    let html = Request::get(Url::parse("https://shop.example/index.html").unwrap());
    seed_entry(&t.store, "ortocat-cache-v2.1", &css, b"", 1);
    seed_entry(&t.store, "ortocat-cache-v2.1", &html, b"", 1);

    match t.router.handle_command(ControlCommand::CacheStats).await {
      ControlReply::CacheStats { stats, cache_name, .. } => {
        assert_eq!(cache_name, "ortocat-cache-v2.1");
        assert_eq!(stats.total, 2);
        assert_eq!(stats.css, 1);
        assert_eq!(stats.html, 1);
      }
      other => panic!("expected CacheStats, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn clear_cache_rebuilds_from_precache() {
    let fetcher = Arc::new(ScriptedFetcher::respond_with(
      Response::new(200).with_body("text/html", "<html>"),
    ));

    let mut config = test_config();
    config.precache = vec![Url::parse("https://shop.example/").unwrap()];
    let t = test_router_with(fetcher, config, FallbackContent::default());

    let stale = Request::get(Url::parse("https://shop.example/old.css").unwrap());
    seed_entry(&t.store, "ortocat-cache-v2.1", &stale, b"", 1);

    match t.router.handle_command(ControlCommand::ClearCache).await {
      ControlReply::ClearCache { success, .. } => assert!(success),
      other => panic!("expected ClearCache, got {:?}", other),
    }

    let urls = t.store.urls("ortocat-cache-v2.1").unwrap();
    assert_eq!(urls, vec!["https://shop.example/"]);
  }

  #[tokio::test]
  async fn check_update_compares_published_version() {
    let fetcher = Arc::new(ScriptedFetcher::respond_with(
      Response::new(200).with_body("application/json", r#"{"version":"3.0"}"#),
    ));
    let t = test_router(fetcher);

    match t.router.handle_command(ControlCommand::CheckUpdate).await {
      ControlReply::CheckUpdate { has_update } => assert!(has_update),
      other => panic!("expected CheckUpdate, got {:?}", other),
    }

    // Any failure reads as "no update"
    let offline = test_router(Arc::new(ScriptedFetcher::failing()));
    match offline.router.handle_command(ControlCommand::CheckUpdate).await {
      ControlReply::CheckUpdate { has_update } => assert!(!has_update),
      other => panic!("expected CheckUpdate, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn sync_now_overwrites_catalog_entry() {
    let fetcher = Arc::new(ScriptedFetcher::respond_with(
      Response::new(200).with_body("application/json", r#"{"products":[{"id":1}]}"#),
    ));
    let mut t = test_router(fetcher);

    match t.router.handle_command(ControlCommand::SyncNow).await {
      ControlReply::SyncNow { success } => assert!(success),
      other => panic!("expected SyncNow, got {:?}", other),
    }

    match t.notices.recv().await {
      Some(WorkerNotice::DataUpdated { count, .. }) => assert_eq!(count, 1),
      other => panic!("expected DataUpdated, got {:?}", other),
    }

    let cached = t.store.get("ortocat-cache-v2.1", &catalog_request().key()).unwrap();
    assert!(cached.is_some());
  }
}
