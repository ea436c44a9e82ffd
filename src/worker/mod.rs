//! Offline resource cache router.
//!
//! Classifies every outgoing GET request into a resource class and
//! applies a distinct cache strategy per class, mediating between a
//! network fetcher and a generation-namespaced cache store. A narrow
//! control channel accepts typed commands; a one-way notice channel
//! reports cache and data updates back to the application.

mod control;
mod fallback;
mod fetch;
mod notice;
mod request;
mod router;

pub use control::{CacheStats, ControlCommand, ControlReply};
pub use fallback::FallbackContent;
pub use fetch::{HttpFetcher, NetworkFetcher};
pub use notice::WorkerNotice;
pub use request::{classify, ContentKind, Request, ResourceClass, Response};
pub use router::{CacheRouter, RouterConfig};
