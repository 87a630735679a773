use std::collections::BTreeMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::event::Transferred;

use super::AccountId;

/// Host-provided metadata for an account that is a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub payable: bool,
}

/// State backend for the ledger.
///
/// Balances and the total supply live in separate namespaces. A missing
/// balance reads as zero and writing a zero balance removes the record, so
/// no implementation ever holds a zero entry. Every mutation the ledger makes
/// happens between `begin` and either `commit` or `rollback`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&mut self) -> Result<()>;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;

    async fn balance(&self, account: &AccountId) -> Result<u64>;
    async fn set_balance(&mut self, account: &AccountId, amount: u64) -> Result<()>;

    async fn total_supply(&self) -> Result<u64>;
    async fn set_total_supply(&mut self, amount: u64) -> Result<()>;

    async fn contract(&self, account: &AccountId) -> Result<Option<ContractInfo>>;

    async fn append_event(&mut self, event: &Transferred) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct State {
    balances: BTreeMap<AccountId, u64>,
    total_supply: u64,
    contracts: BTreeMap<AccountId, ContractInfo>,
    events: Vec<Transferred>,
}

/// In-process store. A transaction is a snapshot of the whole state that
/// `rollback` restores.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: State,
    snapshot: Option<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_contract(&mut self, account: AccountId, info: ContractInfo) {
        self.state.contracts.insert(account, info);
    }

    pub fn balances(&self) -> &BTreeMap<AccountId, u64> {
        &self.state.balances
    }

    pub fn events(&self) -> &[Transferred] {
        &self.state.events
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            bail!("Transaction already open");
        }
        self.snapshot = Some(self.state.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.snapshot.take().is_none() {
            bail!("No transaction to commit");
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        match self.snapshot.take() {
            Some(state) => {
                self.state = state;
                Ok(())
            }
            None => bail!("No transaction to roll back"),
        }
    }

    async fn balance(&self, account: &AccountId) -> Result<u64> {
        Ok(self.state.balances.get(account).copied().unwrap_or_default())
    }

    async fn set_balance(&mut self, account: &AccountId, amount: u64) -> Result<()> {
        if amount == 0 {
            self.state.balances.remove(account);
        } else {
            self.state.balances.insert(*account, amount);
        }
        Ok(())
    }

    async fn total_supply(&self) -> Result<u64> {
        Ok(self.state.total_supply)
    }

    async fn set_total_supply(&mut self, amount: u64) -> Result<()> {
        self.state.total_supply = amount;
        Ok(())
    }

    async fn contract(&self, account: &AccountId) -> Result<Option<ContractInfo>> {
        Ok(self.state.contracts.get(account).copied())
    }

    async fn append_event(&mut self, event: &Transferred) -> Result<()> {
        self.state.events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_balance_is_absent() -> Result<()> {
        let mut store = MemoryStore::new();
        let account = AccountId::new([1; 20]);

        assert_eq!(store.balance(&account).await?, 0);
        store.set_balance(&account, 5).await?;
        assert_eq!(store.balance(&account).await?, 5);
        assert_eq!(store.balances().len(), 1);

        store.set_balance(&account, 0).await?;
        assert_eq!(store.balance(&account).await?, 0);
        assert!(store.balances().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_rollback_restores_snapshot() -> Result<()> {
        let mut store = MemoryStore::new();
        let account = AccountId::new([1; 20]);
        store.set_balance(&account, 10).await?;

        store.begin().await?;
        assert!(store.in_transaction());
        store.set_balance(&account, 3).await?;
        store.set_total_supply(99).await?;
        store
            .append_event(&Transferred {
                from: None,
                to: account,
                amount: 3,
            })
            .await?;
        store.rollback().await?;

        assert!(!store.in_transaction());
        assert_eq!(store.balance(&account).await?, 10);
        assert_eq!(store.total_supply().await?, 0);
        assert!(store.events().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_transaction_bookkeeping() -> Result<()> {
        let mut store = MemoryStore::new();
        assert!(store.commit().await.is_err());
        assert!(store.rollback().await.is_err());

        store.begin().await?;
        assert!(store.begin().await.is_err());
        store.set_total_supply(7).await?;
        store.commit().await?;
        assert_eq!(store.total_supply().await?, 7);
        Ok(())
    }
}
