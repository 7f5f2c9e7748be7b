//! # trustgate-escrow — Escrow Ledger
//!
//! Holds a consumer's payment until the delivery or move-in is confirmed,
//! then releases it to the counterparty minus the platform fee.
//!
//! - **Transaction** ([`transaction`]): the escrow state machine. Transitions
//!   are copy-on-write: [`EscrowTransaction::apply`] returns the next
//!   transaction and leaves the original untouched.
//!
//! - **Fee** ([`fee`]): basis-point fee split in integer minor units.
//!
//! - **Ledger** ([`ledger`]): thread-safe store of transactions keyed by
//!   [`EscrowId`](trustgate_core::EscrowId) with lazy deadline write-through.
//!
//! ## State Machine
//!
//! ```text
//! none ──fundsCommitted──▶ held ──deliveryOrMoveInConfirmed──▶ release_window ──counterpartyConfirmsOrDeadlinePasses──▶ released
//!                           │                                       │
//!                           └──────────disputeRaised──────┬─────────┘
//!                                                         ▼
//!                                                     disputed ──resolutionFavorsPayee──▶ released
//!                                                         │
//!                                                         └──resolutionFavorsPayer──▶ refunded
//! ```
//!
//! `released` and `refunded` are terminal. The deadline transition out of
//! `release_window` is never scheduled; it is computed on read.

pub mod error;
pub mod fee;
pub mod ledger;
pub mod transaction;

pub use error::EscrowError;
pub use fee::{net_amount, platform_fee, FeeRate, FeeSplit};
pub use ledger::EscrowLedger;
pub use transaction::{
    resolve_status, EscrowEvent, EscrowStatus, EscrowTransaction, EscrowTransitionRecord,
    TransitionTrigger,
};
