//! # Persona Error Types
//!
//! Every variant leaves the caller's session untouched. The caller decides
//! how to surface the denial; this crate never substitutes another role.

use thiserror::Error;

use trustgate_core::{ActiveRole, Persona};

/// Errors arising from persona session operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersonaError {
    /// Target persona has not been unlocked for this identity.
    #[error("cannot switch from {current} to {target}: persona not unlocked (unlocked: {unlocked})")]
    InvalidRoleSwitch {
        /// The role the session was acting as.
        current: ActiveRole,
        /// The requested persona.
        target: Persona,
        /// Comma-separated unlocked personas at the time of the request.
        unlocked: String,
    },

    /// Operation requires an authenticated session.
    #[error("cannot {operation} on a guest session")]
    NotAuthenticated {
        /// The attempted operation.
        operation: &'static str,
    },

    /// A persisted session violates a session invariant.
    #[error("corrupt session snapshot: {0}")]
    CorruptSnapshot(String),
}

/// Failure reported by a [`SessionSink`](crate::SessionSink).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("session sink failed: {0}")]
pub struct SinkError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_role_switch_display() {
        let err = PersonaError::InvalidRoleSwitch {
            current: ActiveRole::Persona(Persona::Consumer),
            target: Persona::Admin,
            unlocked: "consumer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("consumer"));
        assert!(msg.contains("admin"));
        assert!(msg.contains("not unlocked"));
    }

    #[test]
    fn not_authenticated_display() {
        let err = PersonaError::NotAuthenticated {
            operation: "unlock_role",
        };
        assert_eq!(err.to_string(), "cannot unlock_role on a guest session");
    }

    #[test]
    fn sink_error_display() {
        assert!(SinkError("disk full".into()).to_string().contains("disk full"));
    }
}
