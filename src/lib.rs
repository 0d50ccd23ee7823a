//! Single-upstream HTTP relay with an origin allow-list.
//!
//! Requests under `/api` are rewritten against one fixed upstream origin and
//! forwarded; everything else is served from a static asset directory with
//! single-page-app fallback. A CORS origin gate runs in front of both.

// Core subsystems
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
