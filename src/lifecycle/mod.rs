//! Lifecycle management subsystem.
//!
//! Startup is fail-fast (config, then server build, then listen); shutdown is
//! graceful, driven either by Ctrl+C or by the [`Shutdown`] coordinator.

pub mod shutdown;

pub use shutdown::Shutdown;
