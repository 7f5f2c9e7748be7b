//! # Identity Verification Facts
//!
//! The identity store hands the gate an [`Identity`] read-only. The gate
//! never writes these fields. Student verification is a derived fact: both
//! the institution and the matriculation number must be present.

use serde::{Deserialize, Serialize};

use crate::identity::IdentityId;

/// An actor record as supplied by the identity/profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// The identity this record belongs to.
    pub id: IdentityId,
    /// Institution the actor claims enrolment at. Empty when not provided.
    #[serde(default)]
    pub institution: String,
    /// Matriculation number issued by the institution. Empty when not provided.
    #[serde(default)]
    pub matric_number: String,
}

impl Identity {
    /// An identity with no verification facts.
    pub fn unverified(id: IdentityId) -> Self {
        Self {
            id,
            institution: String::new(),
            matric_number: String::new(),
        }
    }

    /// An identity carrying both student facts.
    pub fn student(
        id: IdentityId,
        institution: impl Into<String>,
        matric_number: impl Into<String>,
    ) -> Self {
        Self {
            id,
            institution: institution.into(),
            matric_number: matric_number.into(),
        }
    }

    /// `institution` non-empty AND `matric_number` non-empty.
    ///
    /// Whitespace-only values count as empty.
    pub fn is_verified_student(&self) -> bool {
        !self.institution.trim().is_empty() && !self.matric_number.trim().is_empty()
    }
}
