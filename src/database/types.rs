use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{event::Transferred, ledger::AccountId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct BalanceRow {
    pub account: AccountId,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ContractRow {
    pub account: AccountId,
    pub payable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct TransferRow {
    #[builder(default = 0)]
    pub id: i64,
    pub sender: Option<AccountId>,
    pub recipient: AccountId,
    pub amount: u64,
}

impl From<&Transferred> for TransferRow {
    fn from(event: &Transferred) -> Self {
        TransferRow::builder()
            .maybe_sender(event.from)
            .recipient(event.to)
            .amount(event.amount)
            .build()
    }
}

impl From<TransferRow> for Transferred {
    fn from(row: TransferRow) -> Self {
        Transferred {
            from: row.sender,
            to: row.recipient,
            amount: row.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TransferQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl TransferQuery {
    pub const DEFAULT_LIMIT: u64 = 20;
    pub const MAX_LIMIT: u64 = 1000;

    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT)
    }

    /// SQLite binds integers as i64.
    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or_default().min(i64::MAX as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_query_bounds() {
        let query = TransferQuery::default();
        assert_eq!(query.offset(), 0);
        assert_eq!(query.limit(), TransferQuery::DEFAULT_LIMIT);

        let query = TransferQuery {
            offset: Some(u64::MAX),
            limit: Some(u64::MAX),
        };
        assert_eq!(query.offset(), i64::MAX as u64);
        assert_eq!(query.limit(), TransferQuery::MAX_LIMIT);
    }
}
