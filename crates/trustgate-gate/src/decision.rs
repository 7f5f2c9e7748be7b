//! # Access Decisions
//!
//! [`AccessDecision`] records every predicate for one evaluation, in the
//! shape hosts and the CLI serialize. [`resolve_location`] applies the
//! precise-location predicate to the obfuscator.

use serde::{Deserialize, Serialize};

use trustgate_core::{GeoCoordinate, ResourceId, ViewerId};
use trustgate_escrow::{EscrowStatus, EscrowTransaction};
use trustgate_geo::{GeoError, GeoPrivacyObfuscator, MapView};

use crate::visibility::VisibilityGate;

/// All gate predicates for one `(session, identity, escrow)` at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub is_guest: bool,
    pub is_consumer_active: bool,
    pub is_verified_student: bool,
    pub can_access_roommate_matching: bool,
    pub needs_identity_verification: bool,
    pub has_escrow_payment: bool,
    pub show_precise_location: bool,
    pub can_contact_counterparty: bool,
    /// Effective escrow status at evaluation time, if an escrow was given.
    pub escrow_status: Option<EscrowStatus>,
}

impl AccessDecision {
    pub fn evaluate(gate: &VisibilityGate<'_>, escrow: Option<&EscrowTransaction>) -> Self {
        Self {
            is_guest: gate.is_guest(),
            is_consumer_active: gate.is_consumer_active(),
            is_verified_student: gate.is_verified_student(),
            can_access_roommate_matching: gate.can_access_roommate_matching(),
            needs_identity_verification: gate.needs_identity_verification(),
            has_escrow_payment: gate.has_escrow_payment(escrow),
            show_precise_location: gate.show_precise_location(escrow),
            can_contact_counterparty: gate.can_contact_counterparty(escrow),
            escrow_status: escrow.map(|tx| tx.status_at(gate.now())),
        }
    }
}

/// The map view `viewer` gets for `resource`, given the gate's decision.
///
/// # Errors
///
/// [`GeoError::LocationUnavailable`] when `coordinate` is `None`.
pub fn resolve_location(
    gate: &VisibilityGate<'_>,
    obfuscator: &GeoPrivacyObfuscator,
    viewer: ViewerId,
    resource: ResourceId,
    coordinate: Option<GeoCoordinate>,
    escrow: Option<&EscrowTransaction>,
) -> Result<MapView, GeoError> {
    let precise = gate.show_precise_location(escrow);
    tracing::debug!(%viewer, %resource, precise, "resolving location");
    obfuscator.obfuscate(viewer, resource, coordinate, precise, gate.now())
}
