use serde::{Deserialize, Serialize};

use super::AccountId;

/// Caller identity as established by the host before an invocation.
///
/// `signers` are the accounts whose witness the host has verified for the
/// current transaction. `calling_contract` is the account of the contract
/// that made the call, if the invocation came from another contract rather
/// than directly from a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    #[serde(default)]
    pub signers: Vec<AccountId>,
    #[serde(default)]
    pub calling_contract: Option<AccountId>,
}

impl CallContext {
    pub fn signed_by(account: AccountId) -> Self {
        Self {
            signers: vec![account],
            calling_contract: None,
        }
    }

    pub fn from_contract(contract: AccountId) -> Self {
        Self {
            signers: vec![],
            calling_contract: Some(contract),
        }
    }

    pub fn with_signer(mut self, account: AccountId) -> Self {
        self.signers.push(account);
        self
    }

    pub fn check_witness(&self, account: &AccountId) -> bool {
        self.signers.contains(account)
    }

    pub fn is_calling_contract(&self, account: &AccountId) -> bool {
        self.calling_contract.as_ref() == Some(account)
    }
}
