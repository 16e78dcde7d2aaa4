//! # cast-seed
//!
//! The idempotent reconciliation engine for castaway.
//!
//! Brings a document store to its declared target state on every run,
//! regardless of how many times it has run before or what state a previous
//! partial run left behind:
//! - collection validators and indexes from the declared catalog,
//! - season content and seed identities converged by natural key with
//!   provenance preserved,
//! - the disposable fixture identity torn down and recreated with
//!   referential integrity intact.
//!
//! Recovery from any failure is rerunning [`orchestrator::run`]; every
//! phase converges.

pub mod catalog;
pub mod content;
pub mod error;
pub mod fixture;
pub mod identities;
pub mod orchestrator;
pub mod reconcile;

pub use error::SeedError;
pub use fixture::ResetReport;
pub use orchestrator::{RunReport, run, run_at};
