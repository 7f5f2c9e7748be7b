//! # Escrow Ledger
//!
//! Thread-safe, cloneable in-memory store of escrow transactions.
//!
//! All operations are synchronous. Updates replace the stored transaction
//! wholesale under one write lock, so a reader sees either the old or the
//! new transaction and never a mix. `parking_lot::RwLock` is non-poisoning:
//! a panicking writer does not wedge the ledger.
//!
//! ## Default Fee Rate
//!
//! The ledger's default rate applies only to transactions created after it
//! is set. Each transaction keeps the rate it was created with.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use trustgate_core::{CounterpartyId, EscrowConfig, EscrowId, Timestamp};

use crate::error::EscrowError;
use crate::fee::FeeRate;
use crate::transaction::{EscrowEvent, EscrowStatus, EscrowTransaction};

/// In-memory escrow ledger.
#[derive(Debug, Clone)]
pub struct EscrowLedger {
    transactions: Arc<RwLock<HashMap<EscrowId, EscrowTransaction>>>,
    default_rate: Arc<RwLock<FeeRate>>,
    release_window_hours: u32,
}

impl EscrowLedger {
    /// Create an empty ledger from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidFeeRate`] if the configured default
    /// rate exceeds 10000 bps.
    pub fn new(config: &EscrowConfig) -> Result<Self, EscrowError> {
        Ok(Self {
            transactions: Arc::new(RwLock::new(HashMap::new())),
            default_rate: Arc::new(RwLock::new(FeeRate::new(config.default_platform_fee_bps)?)),
            release_window_hours: config.release_window_hours,
        })
    }

    /// Rate applied to transactions created from now on.
    pub fn default_fee_rate(&self) -> FeeRate {
        *self.default_rate.read()
    }

    /// Change the rate for future transactions.
    pub fn set_default_fee_rate(&self, rate: FeeRate) {
        let previous = std::mem::replace(&mut *self.default_rate.write(), rate);
        tracing::info!(
            previous_bps = previous.bps(),
            new_bps = rate.bps(),
            "default platform fee rate changed"
        );
    }

    /// Create a transaction in status `none` at the current default rate.
    pub fn open(
        &self,
        amount: u64,
        counterparty: CounterpartyId,
        now: Timestamp,
    ) -> Result<EscrowTransaction, EscrowError> {
        let tx = EscrowTransaction::new(
            amount,
            self.default_fee_rate(),
            counterparty,
            self.release_window_hours,
            now,
        )?;
        self.insert(tx.clone())?;
        tracing::info!(escrow_id = %tx.id(), amount, fee_bps = tx.fee_rate().bps(), "escrow opened");
        Ok(tx)
    }

    /// Create a transaction and commit its funds in one step (`none → held`).
    pub fn commit(
        &self,
        amount: u64,
        counterparty: CounterpartyId,
        now: Timestamp,
    ) -> Result<EscrowTransaction, EscrowError> {
        let tx = self.open(amount, counterparty, now)?;
        self.apply(tx.id(), EscrowEvent::FundsCommitted, now)
    }

    /// Add an existing transaction, e.g. one restored from storage.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::DuplicateEscrow`] if the id is already present.
    pub fn insert(&self, tx: EscrowTransaction) -> Result<(), EscrowError> {
        let mut guard = self.transactions.write();
        if guard.contains_key(&tx.id()) {
            return Err(EscrowError::DuplicateEscrow(tx.id()));
        }
        guard.insert(tx.id(), tx);
        Ok(())
    }

    /// Apply `event` to the transaction `id` at `now`.
    ///
    /// Read, validate, and replace all happen under one write lock. On
    /// error the stored transaction is untouched.
    pub fn apply(
        &self,
        id: EscrowId,
        event: EscrowEvent,
        now: Timestamp,
    ) -> Result<EscrowTransaction, EscrowError> {
        let mut guard = self.transactions.write();
        let current = guard.get(&id).ok_or(EscrowError::EscrowNotFound(id))?;
        let before = current.recorded_status();
        let next = match current.apply(event, now) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(escrow_id = %id, status = %current.status_at(now), event = %event, "escrow transition rejected");
                return Err(e);
            }
        };
        if next.recorded_status() != before {
            tracing::info!(escrow_id = %id, from = %before, to = %next.recorded_status(), event = %event, "escrow transitioned");
        } else {
            tracing::debug!(escrow_id = %id, status = %before, event = %event, "escrow event already applied");
        }
        guard.insert(id, next.clone());
        Ok(next)
    }

    /// Effective status at `now`, writing through an elapsed deadline.
    pub fn status(&self, id: EscrowId, now: Timestamp) -> Result<EscrowStatus, EscrowError> {
        self.get(id, now).map(|tx| tx.recorded_status())
    }

    /// The transaction at `now`, writing through an elapsed deadline.
    pub fn get(&self, id: EscrowId, now: Timestamp) -> Result<EscrowTransaction, EscrowError> {
        let guard = self.transactions.upgradable_read();
        let current = guard.get(&id).ok_or(EscrowError::EscrowNotFound(id))?;
        if current.status_at(now) == current.recorded_status() {
            return Ok(current.clone());
        }
        let resolved = current.resolved(now);
        tracing::info!(escrow_id = %id, to = %resolved.recorded_status(), "release deadline elapsed");
        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        guard.insert(id, resolved.clone());
        Ok(resolved)
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.read().len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ledger() -> EscrowLedger {
        EscrowLedger::new(&EscrowConfig::default()).unwrap()
    }

    #[test]
    fn commit_holds_funds() {
        let ledger = ledger();
        let now = Timestamp::now();
        let tx = ledger.commit(45_000, CounterpartyId::new(), now).unwrap();
        assert_eq!(tx.recorded_status(), EscrowStatus::Held);
        assert_eq!(tx.net_amount(), 39_600);
        assert_eq!(ledger.status(tx.id(), now).unwrap(), EscrowStatus::Held);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn rate_change_does_not_touch_existing() {
        let ledger = ledger();
        let now = Timestamp::now();
        let old = ledger.commit(75_000, CounterpartyId::new(), now).unwrap();
        ledger.set_default_fee_rate(FeeRate::new(500).unwrap());
        let new = ledger.commit(75_000, CounterpartyId::new(), now).unwrap();

        let old = ledger.get(old.id(), now).unwrap();
        assert_eq!(old.fee_rate().bps(), 1200);
        assert_eq!(old.net_amount(), 66_000);
        assert_eq!(new.fee_rate().bps(), 500);
        assert_eq!(new.net_amount(), 71_250);
    }

    #[test]
    fn rejected_transition_leaves_stored_transaction() {
        let ledger = ledger();
        let now = Timestamp::now();
        let tx = ledger.commit(10_000, CounterpartyId::new(), now).unwrap();
        let err = ledger
            .apply(tx.id(), EscrowEvent::ReleaseConfirmed, now)
            .unwrap_err();
        assert!(matches!(err, EscrowError::InvalidEscrowTransition { .. }));
        assert_eq!(ledger.get(tx.id(), now).unwrap(), tx);
    }

    #[test]
    fn status_writes_through_elapsed_deadline() {
        let ledger = ledger();
        let now = Timestamp::now();
        let tx = ledger.commit(10_000, CounterpartyId::new(), now).unwrap();
        ledger
            .apply(tx.id(), EscrowEvent::DeliveryConfirmed, now)
            .unwrap();

        let later = now.plus(Duration::hours(73));
        assert_eq!(ledger.status(tx.id(), later).unwrap(), EscrowStatus::Released);
        // Persisted: a read at the earlier time still sees released.
        assert_eq!(ledger.status(tx.id(), now).unwrap(), EscrowStatus::Released);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let ledger = ledger();
        let id = EscrowId::new();
        assert_eq!(
            ledger.status(id, Timestamp::now()),
            Err(EscrowError::EscrowNotFound(id))
        );
        assert!(ledger
            .apply(id, EscrowEvent::FundsCommitted, Timestamp::now())
            .is_err());
    }

    #[test]
    fn duplicate_insert_rejected() {
        let ledger = ledger();
        let tx = ledger.open(1_000, CounterpartyId::new(), Timestamp::now()).unwrap();
        assert_eq!(ledger.insert(tx.clone()), Err(EscrowError::DuplicateEscrow(tx.id())));
    }

    #[test]
    fn invalid_configured_rate_rejected() {
        let config = EscrowConfig {
            default_platform_fee_bps: 10_500,
            ..EscrowConfig::default()
        };
        assert_eq!(
            EscrowLedger::new(&config).unwrap_err(),
            EscrowError::InvalidFeeRate(10_500)
        );
    }

    #[test]
    fn clones_share_storage() {
        let ledger = ledger();
        let other = ledger.clone();
        let tx = ledger.commit(1_000, CounterpartyId::new(), Timestamp::now()).unwrap();
        assert!(other.get(tx.id(), Timestamp::now()).is_ok());
        assert!(!other.is_empty());
    }

    #[test]
    fn concurrent_commits_are_all_recorded() {
        let ledger = ledger();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        ledger
                            .commit(5_000, CounterpartyId::new(), Timestamp::now())
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(ledger.len(), 200);
    }
}
