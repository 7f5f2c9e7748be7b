//! # Escrow Error Types
//!
//! State machine rejections carry the escrow id, the status at the time of
//! the request, and the rejected event. Nothing is mutated on any error.

use thiserror::Error;

use trustgate_core::EscrowId;

use crate::transaction::{EscrowEvent, EscrowStatus};

/// Errors arising from escrow operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// Event is not valid from the current status.
    #[error("escrow {escrow_id} cannot apply {event} in status {status}")]
    InvalidEscrowTransition {
        /// The escrow transaction.
        escrow_id: EscrowId,
        /// Effective status when the event arrived.
        status: EscrowStatus,
        /// The rejected event.
        event: EscrowEvent,
    },

    /// No transaction with this id is in the ledger.
    #[error("escrow {0} not found")]
    EscrowNotFound(EscrowId),

    /// Transaction with this id already exists in the ledger.
    #[error("escrow {0} already exists")]
    DuplicateEscrow(EscrowId),

    /// Fee rate above 10000 basis points.
    #[error("invalid platform fee rate: {0} bps exceeds 10000")]
    InvalidFeeRate(u32),

    /// Escrow amount must be positive.
    #[error("invalid escrow amount: {0}")]
    InvalidAmount(u64),

    /// A release deadline can only be fixed before the window opens.
    #[error("escrow {escrow_id} cannot take a release deadline in status {status}")]
    DeadlineLocked {
        /// The escrow transaction.
        escrow_id: EscrowId,
        /// Effective status when the deadline was offered.
        status: EscrowStatus,
    },

    /// A stored transaction violates a lifecycle invariant.
    #[error("corrupt escrow record {escrow_id}: {reason}")]
    CorruptRecord {
        /// The escrow transaction.
        escrow_id: EscrowId,
        /// Which invariant failed.
        reason: String,
    },

    /// Status name not recognised.
    #[error("unknown escrow status \"{0}\"")]
    UnknownStatus(String),

    /// Event name not recognised.
    #[error("unknown escrow event \"{0}\"")]
    UnknownEvent(String),
}
