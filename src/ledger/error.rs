use serde::Serialize;
use thiserror::Error as ThisError;

use super::AccountIdError;

/// Conditions that abort an invocation. Nothing the invocation did is kept.
#[derive(ThisError, Debug)]
pub enum Fault {
    #[error("Invalid account: {0}")]
    InvalidAccount(#[from] AccountIdError),
    #[error("Amount must be greater than 0, got {0}")]
    NonPositiveAmount(i64),
    #[error("Max supply reached: max {max}, would have {would_have}")]
    SupplyCapExceeded { max: u64, would_have: u64 },
    #[error("Arithmetic overflow")]
    Overflow,
    #[error("{method} expects {expected} arguments, got {got}")]
    ArgumentCount {
        method: String,
        expected: usize,
        got: usize,
    },
    #[error("Argument {index} of {method} must be {expected}")]
    ArgumentType {
        method: String,
        index: usize,
        expected: &'static str,
    },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Reasons an operation declined without changing state.
#[derive(ThisError, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rejection {
    #[error("Already deployed")]
    AlreadyDeployed,
    #[error("Caller is not authorized")]
    Unauthorized,
    #[error("Recipient contract is not payable")]
    NotPayable,
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

impl From<Outcome> for bool {
    fn from(outcome: Outcome) -> Self {
        outcome.is_accepted()
    }
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        Outcome::Rejected(rejection)
    }
}
