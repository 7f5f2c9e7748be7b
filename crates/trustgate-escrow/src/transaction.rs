//! # Escrow Transaction State Machine
//!
//! ## Transitions
//!
//! | From | Event | To |
//! |---|---|---|
//! | none | fundsCommitted | held |
//! | held | deliveryOrMoveInConfirmed | release_window |
//! | release_window | counterpartyConfirmsOrDeadlinePasses | released |
//! | held, release_window | disputeRaised | disputed |
//! | disputed | resolutionFavorsPayee | released |
//! | disputed | resolutionFavorsPayer | refunded |
//!
//! Anything else is [`EscrowError::InvalidEscrowTransition`]. Applying the
//! event that leads into the current status is a no-op, so retried
//! deliveries of the same trigger are harmless.
//!
//! ## Lazy Deadline
//!
//! A transaction in `release_window` whose `release_deadline` has passed is
//! `released`, whether or not anyone has recorded that yet. Every read goes
//! through [`resolve_status`]; [`EscrowTransaction::resolved`] materializes
//! the result for write-through.

use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use trustgate_core::{CounterpartyId, EscrowId, Timestamp};

use crate::error::EscrowError;
use crate::fee::{FeeRate, FeeSplit};

// ── Status ───────────────────────────────────────────────────────────

/// Lifecycle status of an escrow transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    /// Created, no funds committed yet.
    None,
    /// Funds committed and held by the platform.
    Held,
    /// Delivery or move-in confirmed; waiting for release.
    ReleaseWindow,
    /// A party raised a dispute.
    Disputed,
    /// Funds paid out to the counterparty (terminal).
    Released,
    /// Funds returned to the payer (terminal).
    Refunded,
}

const ALL_STATUSES: [EscrowStatus; 6] = [
    EscrowStatus::None,
    EscrowStatus::Held,
    EscrowStatus::ReleaseWindow,
    EscrowStatus::Disputed,
    EscrowStatus::Released,
    EscrowStatus::Refunded,
];

impl EscrowStatus {
    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::Refunded)
    }

    /// Whether the payer's money has been committed and not returned.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Held | Self::ReleaseWindow | Self::Released)
    }

    /// The canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Held => "held",
            Self::ReleaseWindow => "release_window",
            Self::Disputed => "disputed",
            Self::Released => "released",
            Self::Refunded => "refunded",
        }
    }

    /// The status reached by `event` from `self`, if the table allows it.
    pub fn next(&self, event: EscrowEvent) -> Option<EscrowStatus> {
        use EscrowEvent as E;
        use EscrowStatus as S;
        match (self, event) {
            (S::None, E::FundsCommitted) => Some(S::Held),
            (S::Held, E::DeliveryConfirmed) => Some(S::ReleaseWindow),
            (S::ReleaseWindow, E::ReleaseConfirmed) => Some(S::Released),
            (S::Held | S::ReleaseWindow, E::DisputeRaised) => Some(S::Disputed),
            (S::Disputed, E::ResolvedForPayee) => Some(S::Released),
            (S::Disputed, E::ResolvedForPayer) => Some(S::Refunded),
            _ => None,
        }
    }

    /// Like [`next`](Self::next), but an event whose target is already the
    /// current status yields the current status.
    pub fn after(&self, event: EscrowEvent) -> Option<EscrowStatus> {
        if event.target() == *self {
            return Some(*self);
        }
        self.next(event)
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EscrowStatus {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STATUSES
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| EscrowError::UnknownStatus(s.to_string()))
    }
}

// ── Events ───────────────────────────────────────────────────────────

/// A trigger delivered to the escrow state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowEvent {
    /// Payment gateway confirmed the funds.
    #[serde(rename = "fundsCommitted")]
    FundsCommitted,
    /// Goods delivered or tenant moved in.
    #[serde(rename = "deliveryOrMoveInConfirmed")]
    DeliveryConfirmed,
    /// Counterparty confirmed, or the release deadline passed.
    #[serde(rename = "counterpartyConfirmsOrDeadlinePasses")]
    ReleaseConfirmed,
    /// Either party raised a dispute.
    #[serde(rename = "disputeRaised")]
    DisputeRaised,
    /// Dispute resolved in the counterparty's favour.
    #[serde(rename = "resolutionFavorsPayee")]
    ResolvedForPayee,
    /// Dispute resolved in the payer's favour.
    #[serde(rename = "resolutionFavorsPayer")]
    ResolvedForPayer,
}

const ALL_EVENTS: [EscrowEvent; 6] = [
    EscrowEvent::FundsCommitted,
    EscrowEvent::DeliveryConfirmed,
    EscrowEvent::ReleaseConfirmed,
    EscrowEvent::DisputeRaised,
    EscrowEvent::ResolvedForPayee,
    EscrowEvent::ResolvedForPayer,
];

impl EscrowEvent {
    /// The canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FundsCommitted => "fundsCommitted",
            Self::DeliveryConfirmed => "deliveryOrMoveInConfirmed",
            Self::ReleaseConfirmed => "counterpartyConfirmsOrDeadlinePasses",
            Self::DisputeRaised => "disputeRaised",
            Self::ResolvedForPayee => "resolutionFavorsPayee",
            Self::ResolvedForPayer => "resolutionFavorsPayer",
        }
    }

    /// The status this event leads into.
    pub fn target(&self) -> EscrowStatus {
        match self {
            Self::FundsCommitted => EscrowStatus::Held,
            Self::DeliveryConfirmed => EscrowStatus::ReleaseWindow,
            Self::ReleaseConfirmed | Self::ResolvedForPayee => EscrowStatus::Released,
            Self::DisputeRaised => EscrowStatus::Disputed,
            Self::ResolvedForPayer => EscrowStatus::Refunded,
        }
    }
}

impl std::fmt::Display for EscrowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EscrowEvent {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_EVENTS
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| EscrowError::UnknownEvent(s.to_string()))
    }
}

/// Effective status at `now`.
///
/// `release_window` with a deadline strictly before `now` is `released`.
/// Every other combination is returned as-is.
pub fn resolve_status(
    status: EscrowStatus,
    release_deadline: Option<Timestamp>,
    now: Timestamp,
) -> EscrowStatus {
    match (status, release_deadline) {
        (EscrowStatus::ReleaseWindow, Some(deadline)) if now > deadline => EscrowStatus::Released,
        _ => status,
    }
}

// ── Transition Records ───────────────────────────────────────────────

/// What caused a recorded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    /// An explicit event delivered by a caller.
    Event,
    /// The release deadline passed and a read materialized it.
    DeadlineElapsed,
}

/// One entry in a transaction's transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowTransitionRecord {
    /// Status before.
    pub from: EscrowStatus,
    /// Status after.
    pub to: EscrowStatus,
    /// The event applied.
    pub event: EscrowEvent,
    /// Explicit or lazily materialized.
    pub trigger: TransitionTrigger,
    /// When the transition was recorded.
    pub at: Timestamp,
}

// ── Transaction ──────────────────────────────────────────────────────

/// An escrow-protected transaction.
///
/// Amount, fee rate, and release window are fixed when the transaction is
/// created. Later changes to the ledger's default rate never reach an
/// existing transaction. The net amount is always recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEscrowTransaction")]
pub struct EscrowTransaction {
    id: EscrowId,
    amount: u64,
    platform_fee_bps: FeeRate,
    status: EscrowStatus,
    counterparty: CounterpartyId,
    created_at: Timestamp,
    release_deadline: Option<Timestamp>,
    release_window_hours: u32,
    #[serde(default)]
    transitions: Vec<EscrowTransitionRecord>,
}

/// Unchecked wire form. Stored records pass through
/// [`TryFrom<RawEscrowTransaction>`] so a restored transaction satisfies the
/// same invariants as one built with [`EscrowTransaction::new`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEscrowTransaction {
    id: EscrowId,
    amount: u64,
    platform_fee_bps: FeeRate,
    status: EscrowStatus,
    counterparty: CounterpartyId,
    created_at: Timestamp,
    release_deadline: Option<Timestamp>,
    release_window_hours: u32,
    #[serde(default)]
    transitions: Vec<EscrowTransitionRecord>,
}

impl TryFrom<RawEscrowTransaction> for EscrowTransaction {
    type Error = EscrowError;

    fn try_from(raw: RawEscrowTransaction) -> Result<Self, Self::Error> {
        let corrupt = |reason: &str| EscrowError::CorruptRecord {
            escrow_id: raw.id,
            reason: reason.to_string(),
        };
        if raw.amount == 0 {
            return Err(EscrowError::InvalidAmount(raw.amount));
        }
        if raw.status == EscrowStatus::ReleaseWindow && raw.release_deadline.is_none() {
            return Err(corrupt("release_window without a release deadline"));
        }
        if let Some(last) = raw.transitions.last() {
            if last.to != raw.status {
                return Err(corrupt("transition history does not end at the recorded status"));
            }
        }
        Ok(Self {
            id: raw.id,
            amount: raw.amount,
            platform_fee_bps: raw.platform_fee_bps,
            status: raw.status,
            counterparty: raw.counterparty,
            created_at: raw.created_at,
            release_deadline: raw.release_deadline,
            release_window_hours: raw.release_window_hours,
            transitions: raw.transitions,
        })
    }
}

impl EscrowTransaction {
    /// A new transaction in status `none`.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidAmount`] for a zero amount.
    pub fn new(
        amount: u64,
        fee_rate: FeeRate,
        counterparty: CounterpartyId,
        release_window_hours: u32,
        created_at: Timestamp,
    ) -> Result<Self, EscrowError> {
        if amount == 0 {
            return Err(EscrowError::InvalidAmount(amount));
        }
        Ok(Self {
            id: EscrowId::new(),
            amount,
            platform_fee_bps: fee_rate,
            status: EscrowStatus::None,
            counterparty,
            created_at,
            release_deadline: None,
            release_window_hours,
            transitions: Vec::new(),
        })
    }

    /// Fix the release deadline ahead of time. Kept when the window opens.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::DeadlineLocked`] unless the transaction is
    /// still `none` or `held`. Once the window has opened its deadline is
    /// part of the lifecycle and cannot move.
    pub fn with_release_deadline(mut self, deadline: Timestamp) -> Result<Self, EscrowError> {
        if !matches!(self.status, EscrowStatus::None | EscrowStatus::Held) {
            return Err(EscrowError::DeadlineLocked {
                escrow_id: self.id,
                status: self.status,
            });
        }
        self.release_deadline = Some(deadline);
        Ok(self)
    }

    /// Transaction id.
    pub fn id(&self) -> EscrowId {
        self.id
    }

    /// Gross amount in minor currency units.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Fee rate fixed at creation.
    pub fn fee_rate(&self) -> FeeRate {
        self.platform_fee_bps
    }

    /// Counterparty the funds are destined for.
    pub fn counterparty(&self) -> CounterpartyId {
        self.counterparty
    }

    /// Creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Release deadline, once the window is open.
    pub fn release_deadline(&self) -> Option<Timestamp> {
        self.release_deadline
    }

    /// Status as last recorded, without deadline resolution.
    pub fn recorded_status(&self) -> EscrowStatus {
        self.status
    }

    /// Effective status at `now`.
    pub fn status_at(&self, now: Timestamp) -> EscrowStatus {
        resolve_status(self.status, self.release_deadline, now)
    }

    /// Transition history, oldest first.
    pub fn transitions(&self) -> &[EscrowTransitionRecord] {
        &self.transitions
    }

    /// Fee breakdown at this transaction's fixed rate.
    pub fn fee_split(&self) -> FeeSplit {
        self.platform_fee_bps.split(self.amount)
    }

    /// Counterparty's share.
    pub fn net_amount(&self) -> u64 {
        self.fee_split().net
    }

    /// Copy with any elapsed deadline recorded as a transition.
    pub fn resolved(&self, now: Timestamp) -> Self {
        let effective = self.status_at(now);
        if effective == self.status {
            return self.clone();
        }
        let mut next = self.clone();
        next.transitions.push(EscrowTransitionRecord {
            from: self.status,
            to: effective,
            event: EscrowEvent::ReleaseConfirmed,
            trigger: TransitionTrigger::DeadlineElapsed,
            at: now,
        });
        next.status = effective;
        next
    }

    /// Apply `event` at `now` and return the resulting transaction.
    ///
    /// Any elapsed deadline is resolved first. If `event` leads into the
    /// effective status, the (resolved) transaction is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidEscrowTransition`] if the table has no
    /// entry for the effective status and `event`. `self` is not modified.
    pub fn apply(&self, event: EscrowEvent, now: Timestamp) -> Result<Self, EscrowError> {
        let current = self.resolved(now);
        let to = current
            .status
            .after(event)
            .ok_or(EscrowError::InvalidEscrowTransition {
                escrow_id: self.id,
                status: current.status,
                event,
            })?;
        if to == current.status {
            return Ok(current);
        }

        let mut next = current;
        if to == EscrowStatus::ReleaseWindow && next.release_deadline.is_none() {
            let window = Duration::hours(i64::from(next.release_window_hours));
            next.release_deadline = Some(now.plus(window));
        }
        next.transitions.push(EscrowTransitionRecord {
            from: next.status,
            to,
            event,
            trigger: TransitionTrigger::Event,
            at: now,
        });
        next.status = to;
        Ok(next)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn event() -> impl Strategy<Value = EscrowEvent> {
        (0..ALL_EVENTS.len()).prop_map(|i| ALL_EVENTS[i])
    }

    proptest! {
        /// A rejected event never changes the transaction, and once terminal
        /// the status never moves again.
        #[test]
        fn rejections_leave_state_untouched(events in prop::collection::vec(event(), 0..20)) {
            let now = Timestamp::now();
            let mut tx = EscrowTransaction::new(1_000, FeeRate::DEFAULT, CounterpartyId::new(), 72, now).unwrap();
            let mut terminal: Option<EscrowStatus> = None;
            for e in events {
                match tx.apply(e, now) {
                    Ok(next) => tx = next,
                    Err(EscrowError::InvalidEscrowTransition { status, .. }) => {
                        prop_assert_eq!(status, tx.recorded_status());
                    }
                    Err(other) => prop_assert!(false, "unexpected error {other}"),
                }
                if let Some(t) = terminal {
                    prop_assert_eq!(tx.recorded_status(), t);
                }
                if tx.recorded_status().is_terminal() {
                    terminal = Some(tx.recorded_status());
                }
            }
        }
    }
}
