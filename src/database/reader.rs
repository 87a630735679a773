use anyhow::{Context, Result};
use deadpool::managed::{Object, Pool};

use crate::{config::Config, ledger::AccountId};

use super::{
    pool::{Manager, new_pool},
    queries,
    types::{BalanceRow, ContractRow, TransferQuery, TransferRow},
};

#[derive(Clone)]
pub struct Reader {
    pool: Pool<Manager>,
}

impl Reader {
    pub async fn new(config: Config, filename: &str) -> Result<Self> {
        let pool = new_pool(config, filename).await?;
        Ok(Self { pool })
    }

    pub async fn connection(&self) -> Result<Object<Manager>> {
        self.pool
            .get()
            .await
            .context("Failed to get connection for database reader pool")
    }

    pub async fn balance(&self, account: &AccountId) -> Result<u64> {
        let conn = self.connection().await?;
        Ok(queries::select_balance(&conn, account)
            .await?
            .unwrap_or_default())
    }

    pub async fn balances(&self) -> Result<Vec<BalanceRow>> {
        let conn = self.connection().await?;
        Ok(queries::select_balances(&conn).await?)
    }

    pub async fn total_supply(&self) -> Result<u64> {
        let conn = self.connection().await?;
        Ok(queries::select_total_supply(&conn).await?)
    }

    pub async fn contract(&self, account: &AccountId) -> Result<Option<ContractRow>> {
        let conn = self.connection().await?;
        Ok(queries::select_contract(&conn, account).await?)
    }

    pub async fn transfers(
        &self,
        account: Option<&AccountId>,
        query: TransferQuery,
    ) -> Result<Vec<TransferRow>> {
        let conn = self.connection().await?;
        Ok(match account {
            Some(account) => queries::select_transfers_for_account(&conn, account, query).await?,
            None => queries::select_transfers(&conn, query).await?,
        })
    }
}
