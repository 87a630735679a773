//! Token ledger state machine.
//!
//! [`Ledger`] owns the balance and supply rules and runs every mutating
//! operation inside one [`Store`] transaction. Operations return
//! `Ok(Outcome)` for anything the caller may legitimately run into (a soft
//! rejection leaves state untouched) and `Err(Fault)` for conditions that
//! abort the invocation.

mod account;
mod context;
mod error;
pub mod metadata;
mod store;

pub use account::{ACCOUNT_ID_LEN, AccountId, AccountIdError};
pub use context::CallContext;
pub use error::{Fault, Outcome, Rejection};
pub use store::{ContractInfo, MemoryStore, Store};

use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::event::{EventSubscriber, Transferred};

use metadata::{FACTOR, MAX_SUPPLY, START_SUPPLY};

/// Parameters fixed for the lifetime of a ledger. Supplies are in whole
/// tokens; the ledger scales them by [`FACTOR`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct LedgerConfig {
    pub authority: AccountId,
    #[builder(default = START_SUPPLY)]
    pub start_supply: u64,
    #[builder(default = MAX_SUPPLY)]
    pub max_supply: u64,
}

impl LedgerConfig {
    pub fn new(authority: AccountId) -> Self {
        Self::builder().authority(authority).build()
    }

    pub fn supply_cap(&self) -> Result<u64, Fault> {
        self.max_supply.checked_mul(FACTOR).ok_or(Fault::Overflow)
    }

    pub fn start_amount(&self) -> Result<u64, Fault> {
        self.start_supply.checked_mul(FACTOR).ok_or(Fault::Overflow)
    }
}

fn positive(amount: i64) -> Result<u64, Fault> {
    if amount <= 0 {
        return Err(Fault::NonPositiveAmount(amount));
    }
    Ok(amount as u64)
}

pub struct Ledger<S> {
    config: LedgerConfig,
    store: S,
    subscriber: Option<EventSubscriber>,
    pending: Vec<Transferred>,
}

impl<S: Store> Ledger<S> {
    pub fn new(config: LedgerConfig, store: S) -> Self {
        Self {
            config,
            store,
            subscriber: None,
            pending: vec![],
        }
    }

    pub fn with_subscriber(mut self, subscriber: EventSubscriber) -> Self {
        self.subscriber = Some(subscriber);
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn authority(&self) -> &AccountId {
        &self.config.authority
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub async fn balance_of(&self, account: &AccountId) -> Result<u64, Fault> {
        Ok(self.store.balance(account).await?)
    }

    pub async fn total_supply(&self) -> Result<u64, Fault> {
        Ok(self.store.total_supply().await?)
    }

    /// Answers the host's verification trigger: only the authority may
    /// spend what the ledger account itself holds.
    pub fn verify(&self, ctx: &CallContext) -> bool {
        ctx.check_witness(&self.config.authority)
    }

    pub async fn deploy(&mut self) -> Result<Outcome, Fault> {
        self.store.begin().await?;
        let result = self.apply_deploy().await;
        self.finish("deploy", result).await
    }

    /// Issues `amount` whole tokens to the authority. Minting zero succeeds
    /// without touching the store.
    pub async fn mint(&mut self, ctx: &CallContext, amount: i64) -> Result<Outcome, Fault> {
        if !self.verify(ctx) {
            debug!("mint rejected: {}", Rejection::Unauthorized);
            return Ok(Rejection::Unauthorized.into());
        }
        if amount < 0 {
            return Err(Fault::NonPositiveAmount(amount));
        }
        if amount == 0 {
            return Ok(Outcome::Accepted);
        }
        let amount = (amount as u64)
            .checked_mul(FACTOR)
            .ok_or(Fault::Overflow)?;
        self.store.begin().await?;
        let result = self.apply_mint(amount).await;
        self.finish("mint", result).await
    }

    /// Moves `amount` stored units from `from` to `to`.
    pub async fn transfer(
        &mut self,
        ctx: &CallContext,
        from: &AccountId,
        to: &AccountId,
        amount: i64,
    ) -> Result<Outcome, Fault> {
        let amount = positive(amount)?;
        self.store.begin().await?;
        let result = self.apply_transfer(ctx, from, to, amount).await;
        self.finish("transfer", result).await
    }

    async fn apply_deploy(&mut self) -> Result<Outcome, Fault> {
        if self.store.total_supply().await? != 0 {
            return Ok(Rejection::AlreadyDeployed.into());
        }
        let amount = self.config.start_amount()?;
        if amount == 0 {
            return Err(Fault::NonPositiveAmount(0));
        }
        let max = self.config.supply_cap()?;
        if amount > max {
            return Err(Fault::SupplyCapExceeded {
                max,
                would_have: amount,
            });
        }
        let authority = self.config.authority;
        self.store.set_total_supply(amount).await?;
        self.store.set_balance(&authority, amount).await?;
        self.emit(Transferred {
            from: None,
            to: authority,
            amount,
        })
        .await?;
        Ok(Outcome::Accepted)
    }

    async fn apply_mint(&mut self, amount: u64) -> Result<Outcome, Fault> {
        let max = self.config.supply_cap()?;
        let supply = self.store.total_supply().await?;
        let new_supply = supply.checked_add(amount).ok_or(Fault::Overflow)?;
        if new_supply > max {
            return Err(Fault::SupplyCapExceeded {
                max,
                would_have: new_supply,
            });
        }
        let authority = self.config.authority;
        let balance = self.store.balance(&authority).await?;
        let new_balance = balance.checked_add(amount).ok_or(Fault::Overflow)?;
        self.store.set_balance(&authority, new_balance).await?;
        self.store.set_total_supply(new_supply).await?;
        self.emit(Transferred {
            from: None,
            to: authority,
            amount,
        })
        .await?;
        Ok(Outcome::Accepted)
    }

    async fn apply_transfer(
        &mut self,
        ctx: &CallContext,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<Outcome, Fault> {
        if !self.is_payable(to).await? {
            return Ok(Rejection::NotPayable.into());
        }
        if !ctx.check_witness(from) && !ctx.is_calling_contract(from) {
            return Ok(Rejection::Unauthorized.into());
        }
        let from_balance = self.store.balance(from).await?;
        if from_balance < amount {
            return Ok(Rejection::InsufficientBalance {
                have: from_balance,
                need: amount,
            }
            .into());
        }
        if from == to {
            return Ok(Outcome::Accepted);
        }

        self.store.set_balance(from, from_balance - amount).await?;
        let to_balance = self.store.balance(to).await?;
        let new_to_balance = to_balance.checked_add(amount).ok_or(Fault::Overflow)?;
        self.store.set_balance(to, new_to_balance).await?;

        self.emit(Transferred {
            from: Some(*from),
            to: *to,
            amount,
        })
        .await?;
        Ok(Outcome::Accepted)
    }

    async fn is_payable(&self, account: &AccountId) -> Result<bool, Fault> {
        Ok(self
            .store
            .contract(account)
            .await?
            .is_none_or(|contract| contract.payable))
    }

    async fn emit(&mut self, event: Transferred) -> Result<(), Fault> {
        self.store.append_event(&event).await?;
        self.pending.push(event);
        Ok(())
    }

    async fn finish(
        &mut self,
        operation: &str,
        result: Result<Outcome, Fault>,
    ) -> Result<Outcome, Fault> {
        if let Ok(Outcome::Accepted) = result {
            if let Err(e) = self.store.commit().await {
                self.pending.clear();
                if let Err(rollback_err) = self.store.rollback().await {
                    error!("{} rollback after failed commit: {}", operation, rollback_err);
                }
                return Err(e.into());
            }
            let events = std::mem::take(&mut self.pending);
            info!("{} committed with {} event(s)", operation, events.len());
            if let Some(subscriber) = &self.subscriber {
                for event in events {
                    subscriber.publish(event);
                }
            }
            return Ok(Outcome::Accepted);
        }

        self.pending.clear();
        let rolled_back = self.store.rollback().await;
        match result {
            Ok(outcome) => {
                rolled_back?;
                if let Outcome::Rejected(rejection) = outcome {
                    debug!("{} rejected: {}", operation, rejection);
                }
                Ok(outcome)
            }
            Err(fault) => {
                if let Err(e) = rolled_back {
                    error!("{} rollback failed: {}", operation, e);
                }
                warn!("{} aborted: {}", operation, fault);
                Err(fault)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    const AUTHORITY: AccountId = AccountId::new([0xaa; ACCOUNT_ID_LEN]);
    const ALICE: AccountId = AccountId::new([1; ACCOUNT_ID_LEN]);

    fn new_ledger() -> Ledger<MemoryStore> {
        Ledger::new(LedgerConfig::new(AUTHORITY), MemoryStore::new())
    }

    #[test]
    fn test_config_defaults() {
        let config = LedgerConfig::new(AUTHORITY);
        assert_eq!(config.start_supply, 10_000);
        assert_eq!(config.max_supply, 100_000);
        assert_eq!(config.start_amount().unwrap(), 1_000_000_000_000);
        assert_eq!(config.supply_cap().unwrap(), 10_000_000_000_000);

        let config = LedgerConfig::builder()
            .authority(AUTHORITY)
            .max_supply(u64::MAX)
            .build();
        assert!(matches!(config.supply_cap(), Err(Fault::Overflow)));
    }

    #[tokio::test]
    async fn test_operations_leave_no_open_transaction() -> Result<()> {
        let mut ledger = new_ledger();
        let authority = CallContext::signed_by(AUTHORITY);

        ledger.deploy().await?;
        ledger.deploy().await?;
        ledger.mint(&authority, 5).await?;
        assert!(ledger.mint(&authority, 1_000_000).await.is_err());
        ledger.transfer(&authority, &AUTHORITY, &ALICE, 1).await?;
        ledger
            .transfer(&CallContext::default(), &AUTHORITY, &ALICE, 1)
            .await?;
        assert!(!ledger.store().in_transaction());
        Ok(())
    }

    #[tokio::test]
    async fn test_fault_rolls_back_and_drops_events() -> Result<()> {
        let subscriber = EventSubscriber::new();
        let mut rx = subscriber.subscribe();
        let mut ledger = new_ledger().with_subscriber(subscriber);
        let authority = CallContext::signed_by(AUTHORITY);

        ledger.deploy().await?;
        assert_eq!(rx.try_recv()?.amount, 1_000_000_000_000);

        let result = ledger.mint(&authority, 90_001).await;
        assert!(matches!(result, Err(Fault::SupplyCapExceeded { .. })));
        assert!(rx.try_recv().is_err());
        assert_eq!(ledger.total_supply().await?, 1_000_000_000_000);
        assert_eq!(ledger.balance_of(&AUTHORITY).await?, 1_000_000_000_000);
        assert_eq!(ledger.store().events().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_events_published_after_commit() -> Result<()> {
        let subscriber = EventSubscriber::new();
        let mut rx = subscriber.subscribe();
        let mut ledger = new_ledger().with_subscriber(subscriber);
        let authority = CallContext::signed_by(AUTHORITY);

        ledger.deploy().await?;
        ledger.mint(&authority, 1).await?;
        ledger.transfer(&authority, &AUTHORITY, &ALICE, 42).await?;

        assert_eq!(
            rx.try_recv()?,
            Transferred {
                from: None,
                to: AUTHORITY,
                amount: 1_000_000_000_000,
            }
        );
        assert_eq!(
            rx.try_recv()?,
            Transferred {
                from: None,
                to: AUTHORITY,
                amount: FACTOR,
            }
        );
        assert_eq!(
            rx.try_recv()?,
            Transferred {
                from: Some(AUTHORITY),
                to: ALICE,
                amount: 42,
            }
        );
        assert_eq!(ledger.store().events().len(), 3);
        Ok(())
    }

    #[test]
    fn test_verify_checks_authority_witness() {
        let ledger = new_ledger();
        assert!(ledger.verify(&CallContext::signed_by(AUTHORITY)));
        assert!(ledger.verify(&CallContext::signed_by(ALICE).with_signer(AUTHORITY)));
        assert!(!ledger.verify(&CallContext::signed_by(ALICE)));
        assert!(!ledger.verify(&CallContext::from_contract(AUTHORITY)));
    }
}
