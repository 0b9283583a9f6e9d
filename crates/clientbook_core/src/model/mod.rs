//! Client domain model and shared validation rules.
//!
//! # Responsibility
//! - Define the canonical record used by every repository backend.
//! - Keep one validation engine for direct and bulk construction paths.
//!
//! # Invariants
//! - Invalid input never produces a partially-valid `Client`.
//! - Identifiers are owned by repositories, not by the record itself.

pub mod client;
pub mod validation;
