//! # PersonaState
//!
//! The context object through which sessions change. It owns no session;
//! callers pass the current session in and get the next one back.
//!
//! ## Side Effects
//!
//! - After every successful [`PersonaState::switch_role`], each registered
//!   [`RoleChangeListener`] receives exactly one [`RoleChanged`]. Applying a
//!   theme or re-routing is the listener's business.
//! - After every operation that yields a session, the optional
//!   [`SessionSink`] is offered the persisted form. Sink failures are logged
//!   and otherwise ignored: the returned session is the same either way.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use trustgate_core::{IdentityId, Persona};

use crate::error::{PersonaError, SinkError};
use crate::session::Session;
use crate::snapshot::{PersistedSession, SESSION_STORAGE_KEY};

/// Notification emitted after a successful role switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChanged {
    /// The persona the session now acts as.
    pub new_role: Persona,
}

/// Presentation-layer subscriber for role changes.
pub trait RoleChangeListener: Send + Sync {
    /// Called once per successful switch.
    fn on_role_changed(&self, event: &RoleChanged);
}

impl<F> RoleChangeListener for F
where
    F: Fn(&RoleChanged) + Send + Sync,
{
    fn on_role_changed(&self, event: &RoleChanged) {
        self(event)
    }
}

/// Best-effort durable storage for sessions.
pub trait SessionSink: Send + Sync {
    /// Store `snapshot` under `key`.
    fn save(&self, key: &str, snapshot: &PersistedSession) -> Result<(), SinkError>;

    /// Remove whatever is stored under `key`.
    fn clear(&self, key: &str) -> Result<(), SinkError>;
}

/// Applies persona operations to sessions.
#[derive(Clone, Default)]
pub struct PersonaState {
    listeners: Vec<Arc<dyn RoleChangeListener>>,
    sink: Option<Arc<dyn SessionSink>>,
}

impl std::fmt::Debug for PersonaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaState")
            .field("listeners", &self.listeners.len())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl PersonaState {
    /// A context with no listeners and no sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a role-change listener.
    pub fn with_listener(mut self, listener: Arc<dyn RoleChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Attach a session sink.
    pub fn with_sink(mut self, sink: Arc<dyn SessionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Start a session for `identity`, acting as `consumer`.
    pub fn authenticate(&self, identity: IdentityId) -> Session {
        let session = Session::authenticated(identity);
        tracing::info!(identity = %identity, "session authenticated");
        self.persist(&session);
        session
    }

    /// Switch the active persona.
    ///
    /// # Errors
    ///
    /// Returns [`PersonaError::InvalidRoleSwitch`] if `target` is not
    /// unlocked. No event is emitted and `session` is unchanged.
    pub fn switch_role(&self, session: &Session, target: Persona) -> Result<Session, PersonaError> {
        let next = session.switched_to(target).map_err(|e| {
            tracing::warn!(
                from = %session.active_role(),
                target = %target,
                "role switch rejected"
            );
            e
        })?;
        tracing::info!(from = %session.active_role(), to = %target, "role switched");
        self.persist(&next);
        let event = RoleChanged { new_role: target };
        for listener in &self.listeners {
            listener.on_role_changed(&event);
        }
        Ok(next)
    }

    /// Unlock `role` for the session's identity. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`PersonaError::NotAuthenticated`] for a guest session.
    pub fn unlock_role(&self, session: &Session, role: Persona) -> Result<Session, PersonaError> {
        if session.has_unlocked(role) {
            tracing::debug!(role = %role, "persona already unlocked");
            return Ok(session.clone());
        }
        let next = session.with_unlocked(role)?;
        tracing::info!(role = %role, "persona unlocked");
        self.persist(&next);
        Ok(next)
    }

    /// End the session. The result is always a guest session.
    pub fn reset(&self, session: &Session) -> Session {
        if let Some(identity) = session.identity() {
            tracing::info!(identity = %identity, "session reset");
        }
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.clear(SESSION_STORAGE_KEY) {
                tracing::warn!(error = %e, "failed to clear persisted session");
            }
        }
        Session::guest()
    }

    fn persist(&self, session: &Session) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.save(SESSION_STORAGE_KEY, &session.to_persisted()) {
                tracing::warn!(error = %e, "failed to persist session; continuing in memory");
            }
        }
    }
}
