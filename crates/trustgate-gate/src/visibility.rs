//! # Visibility Predicates
//!
//! A [`VisibilityGate`] borrows one session and the identity record the
//! store supplied for it. Nothing here mutates or caches; the same inputs
//! always produce the same answers.

use trustgate_core::{Identity, Persona, Timestamp};
use trustgate_escrow::EscrowTransaction;
use trustgate_state::Session;

/// Predicate evaluator for one session at one instant.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityGate<'a> {
    session: &'a Session,
    identity: Option<&'a Identity>,
    now: Timestamp,
}

impl<'a> VisibilityGate<'a> {
    /// `identity` is the store's record for the session's identity, or
    /// `None` for guests and identities without a profile.
    pub fn new(session: &'a Session, identity: Option<&'a Identity>, now: Timestamp) -> Self {
        Self {
            session,
            identity,
            now,
        }
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    /// Instant at which escrow status is read.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn is_guest(&self) -> bool {
        self.session.is_guest()
    }

    pub fn is_consumer_active(&self) -> bool {
        !self.is_guest() && self.session.active_role().persona() == Some(Persona::Consumer)
    }

    /// Student facts from the supplied identity. A record belonging to a
    /// different identity than the session's is ignored.
    pub fn is_verified_student(&self) -> bool {
        let Some(identity) = self.identity else {
            return false;
        };
        if self.session.identity() != Some(identity.id) {
            tracing::warn!(
                supplied = %identity.id,
                session = ?self.session.identity(),
                "identity record does not belong to session; treating as unverified"
            );
            return false;
        }
        identity.is_verified_student()
    }

    pub fn can_access_roommate_matching(&self) -> bool {
        self.is_consumer_active() && self.is_verified_student()
    }

    pub fn needs_identity_verification(&self) -> bool {
        !self.is_guest() && !self.is_verified_student()
    }

    /// Funds are held, in the release window, or released, as of `now`.
    /// No escrow means no payment.
    pub fn has_escrow_payment(&self, escrow: Option<&EscrowTransaction>) -> bool {
        escrow.is_some_and(|tx| tx.status_at(self.now).is_paid())
    }

    pub fn show_precise_location(&self, escrow: Option<&EscrowTransaction>) -> bool {
        self.paid_consumer(escrow)
    }

    pub fn can_contact_counterparty(&self, escrow: Option<&EscrowTransaction>) -> bool {
        self.paid_consumer(escrow)
    }

    // Shared rule for the escrow-gated actions. Keep both entry points on it.
    fn paid_consumer(&self, escrow: Option<&EscrowTransaction>) -> bool {
        !self.is_guest() && self.is_consumer_active() && self.has_escrow_payment(escrow)
    }
}
