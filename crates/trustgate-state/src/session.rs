//! # Session Value
//!
//! ```text
//! guest ──authenticate──▶ consumer ──switch_role──▶ any unlocked persona
//!   ▲                        │
//!   └──────────reset─────────┘
//! ```
//!
//! Fields are private so the invariants cannot be broken from outside the
//! crate. Operations that notify listeners go through
//! [`PersonaState`](crate::PersonaState); the methods here are the pure
//! transition rules.

use std::collections::BTreeSet;

use trustgate_core::{ActiveRole, IdentityId, Persona};

use crate::error::PersonaError;

/// An actor's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Option<IdentityId>,
    active_role: ActiveRole,
    unlocked_roles: BTreeSet<Persona>,
}

impl Session {
    /// An unauthenticated session.
    pub fn guest() -> Self {
        Self {
            identity: None,
            active_role: ActiveRole::Guest,
            unlocked_roles: BTreeSet::new(),
        }
    }

    /// A freshly authenticated session acting as `consumer`.
    pub(crate) fn authenticated(identity: IdentityId) -> Self {
        Self {
            identity: Some(identity),
            active_role: ActiveRole::Persona(Persona::Consumer),
            unlocked_roles: BTreeSet::from([Persona::Consumer]),
        }
    }

    /// Build from raw parts, checking every invariant.
    pub(crate) fn from_parts(
        identity: Option<IdentityId>,
        active_role: ActiveRole,
        unlocked_roles: BTreeSet<Persona>,
    ) -> Result<Self, PersonaError> {
        match (identity, active_role) {
            (None, ActiveRole::Guest) if unlocked_roles.is_empty() => {}
            (None, _) => {
                return Err(PersonaError::CorruptSnapshot(
                    "guest session must act as guest with no unlocked personas".to_string(),
                ))
            }
            (Some(_), ActiveRole::Guest) => {
                return Err(PersonaError::CorruptSnapshot(
                    "authenticated session cannot act as guest".to_string(),
                ))
            }
            (Some(_), ActiveRole::Persona(p)) => {
                if !unlocked_roles.contains(&Persona::Consumer) {
                    return Err(PersonaError::CorruptSnapshot(
                        "authenticated session must have consumer unlocked".to_string(),
                    ));
                }
                if !unlocked_roles.contains(&p) {
                    return Err(PersonaError::CorruptSnapshot(format!(
                        "active persona {p} is not unlocked"
                    )));
                }
            }
        }
        Ok(Self {
            identity,
            active_role,
            unlocked_roles,
        })
    }

    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<IdentityId> {
        self.identity
    }

    /// The role the session is acting as.
    pub fn active_role(&self) -> ActiveRole {
        self.active_role
    }

    /// Personas unlocked for this identity.
    pub fn unlocked_roles(&self) -> &BTreeSet<Persona> {
        &self.unlocked_roles
    }

    /// Whether the session is unauthenticated.
    pub fn is_guest(&self) -> bool {
        self.active_role.is_guest()
    }

    /// Whether `persona` has been unlocked.
    pub fn has_unlocked(&self, persona: Persona) -> bool {
        self.unlocked_roles.contains(&persona)
    }

    /// `active_role ∈ unlocked_roles ∪ {guest}`.
    pub fn is_consistent(&self) -> bool {
        match self.active_role {
            ActiveRole::Guest => true,
            ActiveRole::Persona(p) => self.unlocked_roles.contains(&p),
        }
    }

    /// Session acting as `target`, or `InvalidRoleSwitch`.
    pub(crate) fn switched_to(&self, target: Persona) -> Result<Self, PersonaError> {
        if !self.unlocked_roles.contains(&target) {
            return Err(PersonaError::InvalidRoleSwitch {
                current: self.active_role,
                target,
                unlocked: self.unlocked_list(),
            });
        }
        Ok(Self {
            active_role: ActiveRole::Persona(target),
            ..self.clone()
        })
    }

    /// Session with `persona` unlocked. Already-unlocked is a no-op.
    pub(crate) fn with_unlocked(&self, persona: Persona) -> Result<Self, PersonaError> {
        if self.identity.is_none() {
            return Err(PersonaError::NotAuthenticated {
                operation: "unlock_role",
            });
        }
        let mut next = self.clone();
        next.unlocked_roles.insert(persona);
        Ok(next)
    }

    fn unlocked_list(&self) -> String {
        self.unlocked_roles
            .iter()
            .map(Persona::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::guest()
    }
}
