use anyhow::{Result, bail};
use async_trait::async_trait;
use libsql::Connection;

use crate::{
    event::Transferred,
    ledger::{AccountId, ContractInfo, Store},
};

use super::{
    queries::{
        delete_balance, insert_transfer, select_balance, select_contract, select_total_supply,
        upsert_balance, upsert_contract, upsert_total_supply,
    },
    types::{ContractRow, TransferRow},
};

/// Ledger state on the writer connection. One transaction at a time; the
/// ledger never nests them.
#[derive(Clone)]
pub struct SqlStore {
    conn: Connection,
    in_transaction: bool,
}

impl SqlStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            in_transaction: false,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    pub async fn register_contract(&self, account: AccountId, info: ContractInfo) -> Result<()> {
        let row = ContractRow::builder()
            .account(account)
            .payable(info.payable)
            .build();
        upsert_contract(&self.conn, &row).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for SqlStore {
    async fn begin(&mut self) -> Result<()> {
        if self.in_transaction {
            bail!("Transaction already open");
        }
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if !self.in_transaction {
            bail!("No transaction to commit");
        }
        self.conn.execute("COMMIT", ()).await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if !self.in_transaction {
            bail!("No transaction to roll back");
        }
        self.in_transaction = false;
        self.conn.execute("ROLLBACK", ()).await?;
        Ok(())
    }

    async fn balance(&self, account: &AccountId) -> Result<u64> {
        Ok(select_balance(&self.conn, account)
            .await?
            .unwrap_or_default())
    }

    async fn set_balance(&mut self, account: &AccountId, amount: u64) -> Result<()> {
        if amount == 0 {
            delete_balance(&self.conn, account).await?;
        } else {
            upsert_balance(&self.conn, account, amount).await?;
        }
        Ok(())
    }

    async fn total_supply(&self) -> Result<u64> {
        Ok(select_total_supply(&self.conn).await?)
    }

    async fn set_total_supply(&mut self, amount: u64) -> Result<()> {
        upsert_total_supply(&self.conn, amount).await?;
        Ok(())
    }

    async fn contract(&self, account: &AccountId) -> Result<Option<ContractInfo>> {
        Ok(select_contract(&self.conn, account)
            .await?
            .map(|row| ContractInfo {
                payable: row.payable,
            }))
    }

    async fn append_event(&mut self, event: &Transferred) -> Result<()> {
        insert_transfer(&self.conn, &TransferRow::from(event)).await?;
        Ok(())
    }
}
