//! # trustgate-core — Foundational Types for the Trust Gate
//!
//! This crate is the leaf of the trust gate workspace. It defines the
//! primitives every policy decision is made from. Every other crate in the
//! workspace depends on `trustgate-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `IdentityId`, `EscrowId`,
//!    `ResourceId`, `ViewerId`, `CounterpartyId`. No bare strings or UUIDs
//!    cross a crate boundary.
//!
//! 2. **One persona catalog.** `Persona` has exactly six variants in catalog
//!    order. The unauthenticated `guest` is not a persona; it only exists as
//!    [`ActiveRole::Guest`], so a guest can never appear in an unlocked set.
//!
//! 3. **Derived verification.** [`Identity::is_verified_student`] is computed
//!    from the stored facts on every call and is never serialized.
//!
//! 4. **Validated coordinates.** A [`GeoCoordinate`] cannot hold a latitude
//!    outside `[-90, 90]`, a longitude outside `[-180, 180]`, or a NaN.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `trustgate-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod geo;
pub mod identity;
pub mod persona;
pub mod temporal;
pub mod verification;

// Re-export primary types for ergonomic imports.
pub use config::{EscrowConfig, GeoConfig, TrustGateConfig, BPS_DENOMINATOR};
pub use error::{ConfigError, CoreError};
pub use geo::GeoCoordinate;
pub use identity::{CounterpartyId, EscrowId, IdentityId, ResourceId, ViewerId};
pub use persona::{ActiveRole, Persona, PERSONA_CATALOG};
pub use temporal::Timestamp;
pub use verification::Identity;
