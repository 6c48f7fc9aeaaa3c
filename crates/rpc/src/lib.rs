//! Tally RPC - HTTP service and CLI orchestration
//!
//! Wires the identity gate, budget ledger and transaction coordinator
//! into an axum application. Components can be backed by memory or
//! SQLite stores, and the identity/budget dependencies can live
//! in-process or behind remote URLs.

pub mod context;
pub mod error;
pub mod routes;

pub use context::{AppContext, ContextConfig};
pub use routes::router;
