//! # cast-core
//!
//! Core types, collection names, and ID conventions for castaway.
//!
//! This crate provides the foundational types shared across all castaway
//! crates:
//! - Entity structs for the season content documents
//! - Collection name constants (the durable persisted contract)
//! - ID prefix constants and formatting helpers

pub mod collections;
pub mod entities;
pub mod ids;
