//! # trustgate-gate — Visibility Gate
//!
//! Pure predicates over `(session, identity, escrow)` that decide what an
//! actor may see and do:
//!
//! ```text
//! isGuest                    activeRole == guest
//! isConsumerActive           !isGuest && activeRole == consumer
//! canAccessRoommateMatching  isConsumerActive && isVerifiedStudent
//! needsIdentityVerification  !isGuest && !isVerifiedStudent
//! hasEscrowPayment           escrow status ∈ { held, release_window, released }
//! showPreciseLocation        !isGuest && isConsumerActive && hasEscrowPayment
//! canContactCounterparty     !isGuest && isConsumerActive && hasEscrowPayment
//! ```
//!
//! Escrow status is read at the gate's `now`, so a release window whose
//! deadline has passed counts as `released` without anyone having written
//! that transition.
//!
//! [`resolve_location`] chains the gate into the obfuscator so a host gets
//! a [`MapView`](trustgate_geo::MapView) in one call.

pub mod decision;
pub mod visibility;

pub use decision::{resolve_location, AccessDecision};
pub use visibility::VisibilityGate;
