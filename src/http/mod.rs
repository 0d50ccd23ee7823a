//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware/origin_gate.rs (admit / reject / answer preflight)
//!     → relay.rs (/api/* : rewrite, forward, buffer, respond)
//!       or the static asset service (everything else)
//!     → Send to client
//! ```

pub mod middleware;
pub mod relay;
pub mod server;

pub use relay::UpstreamTarget;
pub use server::HttpServer;
