//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (PORT, DOMAIN_WHITELIST, UPSTREAM_URL, ...)
//!     → loader.rs (read & parse, recover to defaults)
//!     → RelayConfig (immutable for the process lifetime)
//!     → shared via Arc with every request handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - Every field has a default so an empty environment still boots
//! - A malformed DOMAIN_WHITELIST is logged and replaced by the default
//!   allow-list, never fatal and never surfaced to callers

pub mod loader;
pub mod schema;

pub use schema::AllowList;
pub use schema::ListenerConfig;
pub use schema::RelayConfig;
pub use schema::UpstreamConfig;
