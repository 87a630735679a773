use libsql::{Connection, de::from_row, params};
use serde::de::DeserializeOwned;
use thiserror::Error as ThisError;

use crate::ledger::AccountId;

use super::types::{BalanceRow, ContractRow, TransferQuery, TransferRow};

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("LibSQL error: {0}")]
    LibSQL(#[from] libsql::Error),
    #[error("Row deserialization error: {0}")]
    RowDeserialization(#[from] serde::de::value::Error),
}

async fn collect_rows<T: DeserializeOwned>(mut rows: libsql::Rows) -> Result<Vec<T>, Error> {
    let mut results = vec![];
    while let Some(row) = rows.next().await? {
        results.push(from_row(&row)?);
    }
    Ok(results)
}

pub async fn select_balance(conn: &Connection, account: &AccountId) -> Result<Option<u64>, Error> {
    let mut rows = conn
        .query(
            "SELECT amount FROM balances WHERE account = ?",
            params![account.to_string()],
        )
        .await?;
    Ok(match rows.next().await? {
        Some(row) => Some(row.get::<u64>(0)?),
        None => None,
    })
}

pub async fn upsert_balance(conn: &Connection, account: &AccountId, amount: u64) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO balances (account, amount) VALUES (?, ?)
         ON CONFLICT(account) DO UPDATE SET amount = excluded.amount",
        params![account.to_string(), amount],
    )
    .await?;
    Ok(())
}

pub async fn delete_balance(conn: &Connection, account: &AccountId) -> Result<bool, Error> {
    let num_rows = conn
        .execute(
            "DELETE FROM balances WHERE account = ?",
            params![account.to_string()],
        )
        .await?;
    Ok(num_rows > 0)
}

pub async fn select_balances(conn: &Connection) -> Result<Vec<BalanceRow>, Error> {
    let rows = conn
        .query(
            "SELECT account, amount FROM balances ORDER BY amount DESC, account ASC",
            (),
        )
        .await?;
    collect_rows(rows).await
}

pub async fn sum_balances(conn: &Connection) -> Result<u64, Error> {
    let mut rows = conn
        .query("SELECT COALESCE(SUM(amount), 0) FROM balances", ())
        .await?;
    Ok(match rows.next().await? {
        Some(row) => row.get::<u64>(0)?,
        None => 0,
    })
}

pub async fn select_total_supply(conn: &Connection) -> Result<u64, Error> {
    let mut rows = conn
        .query("SELECT amount FROM supply WHERE id = 0", ())
        .await?;
    Ok(match rows.next().await? {
        Some(row) => row.get::<u64>(0)?,
        None => 0,
    })
}

pub async fn upsert_total_supply(conn: &Connection, amount: u64) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO supply (id, amount) VALUES (0, ?)
         ON CONFLICT(id) DO UPDATE SET amount = excluded.amount",
        params![amount],
    )
    .await?;
    Ok(())
}

pub async fn select_contract(
    conn: &Connection,
    account: &AccountId,
) -> Result<Option<ContractRow>, Error> {
    let mut rows = conn
        .query(
            "SELECT account, payable FROM contracts WHERE account = ?",
            params![account.to_string()],
        )
        .await?;
    Ok(rows.next().await?.map(|r| from_row(&r)).transpose()?)
}

pub async fn upsert_contract(conn: &Connection, row: &ContractRow) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO contracts (account, payable) VALUES (?, ?)
         ON CONFLICT(account) DO UPDATE SET payable = excluded.payable",
        params![row.account.to_string(), row.payable],
    )
    .await?;
    Ok(())
}

pub async fn insert_transfer(conn: &Connection, row: &TransferRow) -> Result<i64, Error> {
    conn.execute(
        "INSERT INTO transfers (sender, recipient, amount) VALUES (?, ?, ?)",
        params![
            row.sender.map(|a| a.to_string()),
            row.recipient.to_string(),
            row.amount
        ],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

pub async fn select_transfers(
    conn: &Connection,
    query: TransferQuery,
) -> Result<Vec<TransferRow>, Error> {
    let rows = conn
        .query(
            "SELECT id, sender, recipient, amount FROM transfers ORDER BY id DESC LIMIT ? OFFSET ?",
            params![query.limit(), query.offset()],
        )
        .await?;
    collect_rows(rows).await
}

pub async fn select_transfers_for_account(
    conn: &Connection,
    account: &AccountId,
    query: TransferQuery,
) -> Result<Vec<TransferRow>, Error> {
    let account = account.to_string();
    let rows = conn
        .query(
            "SELECT id, sender, recipient, amount FROM transfers
             WHERE sender = ? OR recipient = ?
             ORDER BY id DESC LIMIT ? OFFSET ?",
            params![account.clone(), account, query.limit(), query.offset()],
        )
        .await?;
    collect_rows(rows).await
}
