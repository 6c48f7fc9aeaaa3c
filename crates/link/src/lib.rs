//! Tally service links
//!
//! The boundary through which the transaction flow reaches its identity
//! and budget dependencies, whether they live in-process or behind HTTP.
//!
//! Links are exception-free by contract: a transport fault (timeout,
//! connection refused, bad gateway) is converted into the degraded result
//! for that call - an invalid validation, a fallback budget check, an
//! unsuccessful spend outcome - and never surfaces as an `Err`.

pub mod boundary;
pub mod local;
pub mod remote;

pub use boundary::{BudgetLink, IdentityLink, SpendOutcome};
pub use local::{LocalBudgetLink, LocalIdentityLink};
pub use remote::{LinkError, RemoteBudgetLink, RemoteIdentityLink};
