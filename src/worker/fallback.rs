//! Synthesized fallback content for offline responses.
//!
//! The router never surfaces a failure; every strategy terminates in
//! one of the responses built here. Inline defaults can be replaced
//! through configuration (a custom offline page, a custom placeholder
//! image).

use chrono::Utc;
use serde_json::json;

use super::request::Response;

const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><rect width="100" height="100" fill="#f0f0f0"/><text x="50" y="60" font-size="40" text-anchor="middle" fill="#b9c8c3">?</text></svg>"##;

const MINIMAL_OFFLINE_HTML: &str =
  "<h1>Офлайн</h1><p>Приложение временно недоступно</p>";

/// Provider of fallback content, injected into the router.
#[derive(Debug, Clone, Default)]
pub struct FallbackContent {
  offline_page: Option<Vec<u8>>,
  placeholder_image: Option<Vec<u8>>,
}

impl FallbackContent {
  pub fn new(offline_page: Option<Vec<u8>>, placeholder_image: Option<Vec<u8>>) -> Self {
    Self {
      offline_page,
      placeholder_image,
    }
  }

  /// The designated offline document, if one is configured.
  pub fn offline_page(&self) -> Option<Response> {
    self
      .offline_page
      .as_ref()
      .map(|body| Response::new(200).with_body("text/html; charset=utf-8", body.clone()))
  }

  /// Terminal fallback for document requests: a minimal offline page.
  pub fn minimal_offline(&self) -> Response {
    Response::new(503).with_body("text/html; charset=utf-8", MINIMAL_OFFLINE_HTML)
  }

  pub fn placeholder_image(&self) -> Response {
    let body = self
      .placeholder_image
      .clone()
      .unwrap_or_else(|| PLACEHOLDER_SVG.as_bytes().to_vec());
    Response::new(200).with_body("image/svg+xml", body)
  }

  pub fn empty_stylesheet(&self) -> Response {
    Response::new(200).with_body("text/css", "/* офлайн */")
  }

  pub fn empty_script(&self) -> Response {
    Response::new(200).with_body("application/javascript", "// офлайн")
  }

  pub fn not_found(&self) -> Response {
    Response::new(404)
  }

  pub fn service_unavailable(&self) -> Response {
    Response::new(503).with_body("text/plain; charset=utf-8", "Сеть недоступна")
  }

  /// Empty catalog document. Always HTTP 200 and always parseable, so
  /// the calling UI receives valid catalog data even with no network
  /// and no cache.
  pub fn empty_catalog(&self, version: &str) -> Response {
    let body = json!({
      "products": [],
      "message": "Офлайн режим: данные временно недоступны",
      "timestamp": Utc::now().to_rfc3339(),
    });

    let mut response =
      Response::new(200).with_body("application/json; charset=utf-8", body.to_string());
    response.set_header("x-data-source", "fallback");
    response.set_header("x-cache-version", version);
    response
  }
}
