//! Resource requests, responses, and request classification.

use url::Url;

use crate::cache::RequestKey;

/// An outgoing resource request as the router sees it: method, URL,
/// headers, and a caller hint that this is a document (navigation)
/// fetch.
#[derive(Debug, Clone)]
pub struct Request {
  pub method: String,
  pub url: Url,
  pub headers: Vec<(String, String)>,
  pub is_document: bool,
}

impl Request {
  pub fn get(url: Url) -> Self {
    Self {
      method: "GET".to_string(),
      url,
      headers: Vec::new(),
      is_document: false,
    }
  }

  /// A GET for an HTML document (navigation).
  pub fn document(url: Url) -> Self {
    Self {
      is_document: true,
      ..Self::get(url)
    }
  }

  pub fn with_header(mut self, name: &str, value: &str) -> Self {
    self.headers.push((name.to_string(), value.to_string()));
    self
  }

  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  /// Normalized cache identity for this request.
  pub fn key(&self) -> RequestKey {
    RequestKey::new(&self.method, &self.url)
  }
}

/// A resource response: status, headers, body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
  pub status: u16,
  pub headers: Vec<(String, String)>,
  pub body: Vec<u8>,
}

impl Response {
  pub fn new(status: u16) -> Self {
    Self {
      status,
      headers: Vec::new(),
      body: Vec::new(),
    }
  }

  pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
    self.set_header("content-type", content_type);
    self.body = body.into();
    self
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  pub fn header(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  /// Set a header, replacing any existing value.
  pub fn set_header(&mut self, name: &str, value: &str) {
    self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    self.headers.push((name.to_string(), value.to_string()));
  }
}

/// The class a request falls into, which selects the caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
  /// No caching involvement at all; passed straight to the network.
  Excluded,
  /// HTML documents: network-first with a timeout.
  Document,
  /// Stylesheets, scripts, fonts, icons, images: cache-first with
  /// background refresh.
  StaticAsset,
  /// The catalog data document: stale-while-revalidate.
  CatalogData,
  /// Everything else: network-first, cache as fallback only.
  Other,
}

/// Path patterns that never involve the cache: the worker's own update
/// script and live/admin endpoints.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
  "/service-worker.js",
  "/socket.io/",
  "/api/",
  "/admin/",
  "/analytics/",
];

/// Hosts that only ever serve static assets.
const STATIC_HOSTS: &[&str] = &[
  "cdnjs.cloudflare.com",
  "fonts.googleapis.com",
  "fonts.gstatic.com",
];

const STATIC_PATH_SEGMENTS: &[&str] = &["/assets/", "/css/", "/js/", "/fonts/", "/icons/"];

const STATIC_EXTENSIONS: &[&str] = &[
  "css", "js", "woff2", "woff", "ttf", "eot", "svg", "png", "jpg", "jpeg", "gif", "webp", "ico",
];

/// Classify a request. The first matching rule wins; rules are checked
/// in the order listed on [`ResourceClass`].
pub fn classify(request: &Request, extra_exclusions: &[String]) -> ResourceClass {
  if request.method != "GET" {
    return ResourceClass::Excluded;
  }

  let scheme = request.url.scheme();
  if scheme != "http" && scheme != "https" {
    return ResourceClass::Excluded;
  }

  let path = request.url.path();
  let excluded = DEFAULT_EXCLUSIONS
    .iter()
    .any(|pattern| matches_exclusion(path, pattern))
    || extra_exclusions
      .iter()
      .any(|pattern| matches_exclusion(path, pattern));
  if excluded {
    return ResourceClass::Excluded;
  }

  if request.is_document || accepts_html(request) {
    return ResourceClass::Document;
  }

  if is_static_asset(&request.url) {
    return ResourceClass::StaticAsset;
  }

  if path.ends_with("products.json") {
    return ResourceClass::CatalogData;
  }

  ResourceClass::Other
}

/// Exclusions ending in `/` match anywhere in the path; others must
/// match the path exactly.
fn matches_exclusion(path: &str, pattern: &str) -> bool {
  if pattern.ends_with('/') {
    path.contains(pattern)
  } else {
    path == pattern
  }
}

fn accepts_html(request: &Request) -> bool {
  request
    .header("accept")
    .map(|accept| accept.contains("text/html"))
    .unwrap_or(false)
}

fn is_static_asset(url: &Url) -> bool {
  if let Some(host) = url.host_str() {
    if STATIC_HOSTS.contains(&host) {
      return true;
    }
  }

  let path = url.path();
  if STATIC_PATH_SEGMENTS.iter().any(|seg| path.contains(seg)) {
    return true;
  }

  match extension(path) {
    Some(ext) => STATIC_EXTENSIONS.contains(&ext.as_str()),
    None => false,
  }
}

/// Lowercased file extension of the last path segment, if any.
fn extension(path: &str) -> Option<String> {
  let name = path.rsplit('/').next()?;
  let (_, ext) = name.rsplit_once('.')?;
  if ext.is_empty() {
    None
  } else {
    Some(ext.to_ascii_lowercase())
  }
}

/// Content category of a URL, used for typed offline fallbacks and for
/// cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
  Html,
  Stylesheet,
  Script,
  Image,
  Font,
  Other,
}

impl ContentKind {
  pub fn from_path(path: &str) -> Self {
    match extension(path).as_deref() {
      Some("html") | Some("htm") => ContentKind::Html,
      Some("css") => ContentKind::Stylesheet,
      Some("js") => ContentKind::Script,
      Some("png") | Some("jpg") | Some("jpeg") | Some("gif") | Some("webp") | Some("svg") => {
        ContentKind::Image
      }
      Some("woff2") | Some("woff") | Some("ttf") | Some("eot") => ContentKind::Font,
      _ => ContentKind::Other,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn get(url: &str) -> Request {
    Request::get(Url::parse(url).unwrap())
  }

  #[test]
  fn non_get_is_excluded() {
    let mut request = get("https://shop.example/products.json");
    request.method = "POST".to_string();
    assert_eq!(classify(&request, &[]), ResourceClass::Excluded);
  }

  #[test]
  fn special_schemes_are_excluded() {
    let request = get("ftp://shop.example/file.css");
    assert_eq!(classify(&request, &[]), ResourceClass::Excluded);
  }

  #[test]
  fn worker_script_and_api_paths_are_excluded() {
    assert_eq!(
      classify(&get("https://shop.example/service-worker.js"), &[]),
      ResourceClass::Excluded
    );
    assert_eq!(
      classify(&get("https://shop.example/api/orders"), &[]),
      ResourceClass::Excluded
    );
    assert_eq!(
      classify(&get("https://shop.example/admin/login.html"), &[]),
      ResourceClass::Excluded
    );
  }

  #[test]
  fn config_exclusions_apply() {
    let extra = vec!["/metrics/".to_string()];
    assert_eq!(
      classify(&get("https://shop.example/metrics/view.js"), &extra),
      ResourceClass::Excluded
    );
  }

  #[test]
  fn exclusion_wins_over_document_hint() {
    let request = Request::document(Url::parse("https://shop.example/admin/").unwrap());
    assert_eq!(classify(&request, &[]), ResourceClass::Excluded);
  }

  #[test]
  fn document_hint_classifies_as_document() {
    let request = Request::document(Url::parse("https://shop.example/catalog").unwrap());
    assert_eq!(classify(&request, &[]), ResourceClass::Document);
  }

  #[test]
  fn accept_header_classifies_as_document() {
    let request = get("https://shop.example/page").with_header(
      "Accept",
      "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
    );
    assert_eq!(classify(&request, &[]), ResourceClass::Document);
  }

  #[test]
  fn static_assets_by_extension_segment_and_host() {
    assert_eq!(
      classify(&get("https://shop.example/style.css"), &[]),
      ResourceClass::StaticAsset
    );
    assert_eq!(
      classify(&get("https://shop.example/fonts/manrope.woff2"), &[]),
      ResourceClass::StaticAsset
    );
    assert_eq!(
      classify(
        &get("https://cdnjs.cloudflare.com/ajax/libs/font-awesome/all.min.css"),
        &[]
      ),
      ResourceClass::StaticAsset
    );
    assert_eq!(
      classify(&get("https://shop.example/images/brush.webp"), &[]),
      ResourceClass::StaticAsset
    );
  }

  #[test]
  fn extension_match_is_case_insensitive() {
    assert_eq!(
      classify(&get("https://shop.example/LOGO.PNG"), &[]),
      ResourceClass::StaticAsset
    );
  }

  #[test]
  fn catalog_document_is_catalog_data() {
    assert_eq!(
      classify(&get("https://shop.example/products.json"), &[]),
      ResourceClass::CatalogData
    );
  }

  #[test]
  fn everything_else_is_other() {
    assert_eq!(
      classify(&get("https://shop.example/manifest.json"), &[]),
      ResourceClass::Other
    );
  }

  #[test]
  fn content_kind_buckets() {
    assert_eq!(ContentKind::from_path("/index.html"), ContentKind::Html);
    assert_eq!(ContentKind::from_path("/css/style.css"), ContentKind::Stylesheet);
    assert_eq!(ContentKind::from_path("/js/app.js"), ContentKind::Script);
    assert_eq!(ContentKind::from_path("/images/logo.svg"), ContentKind::Image);
    assert_eq!(ContentKind::from_path("/fonts/manrope.woff2"), ContentKind::Font);
    assert_eq!(ContentKind::from_path("/manifest.json"), ContentKind::Other);
    assert_eq!(ContentKind::from_path("/"), ContentKind::Other);
  }

  #[test]
  fn response_set_header_replaces() {
    let mut response = Response::new(200).with_body("application/json", "{}");
    response.set_header("x-data-source", "network");
    response.set_header("X-Data-Source", "cache");
    assert_eq!(response.header("x-data-source"), Some("cache"));
    assert_eq!(
      response
        .headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("x-data-source"))
        .count(),
      1
    );
  }
}
