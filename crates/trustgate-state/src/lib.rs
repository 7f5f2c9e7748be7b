//! # trustgate-state — Persona Session State
//!
//! Tracks who an actor is, which persona they are acting as, and which
//! personas they have unlocked.
//!
//! - **Session** (`session.rs`): an immutable session value. Every operation
//!   returns a new session; nothing is mutated in place, so no caller can
//!   observe a half-applied change.
//!
//! - **PersonaState** (`persona.rs`): the context object that applies
//!   operations to sessions, emits [`RoleChanged`] to registered listeners,
//!   and offers changed sessions to a best-effort [`SessionSink`].
//!
//! - **Snapshot** (`snapshot.rs`): the persisted session layout and its
//!   invariant-checked restore.
//!
//! ## Invariants
//!
//! - `active_role ∈ unlocked_roles ∪ {guest}` at every point.
//! - An authenticated session always has `consumer` unlocked.
//! - A guest session has an empty unlocked set.
//! - An invalid switch is an error. There is no silent fallback role.

pub mod error;
pub mod persona;
pub mod session;
pub mod snapshot;

pub use error::{PersonaError, SinkError};
pub use persona::{PersonaState, RoleChangeListener, RoleChanged, SessionSink};
pub use session::Session;
pub use snapshot::{PersistedSession, SESSION_STORAGE_KEY};
