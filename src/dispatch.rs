//! Method-name dispatch with positional arguments, the way a host VM calls
//! into the contract.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::{
    AccountId, CallContext, Fault, Ledger, Store,
    metadata::{DECIMALS, NAME, SUPPORTED_STANDARDS, SYMBOL},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Bytes(#[serde(with = "hex::serde")] Vec<u8>),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Array(_) => "array",
        }
    }
}

impl From<AccountId> for Value {
    fn from(account: AccountId) -> Self {
        Value::Bytes(account.as_bytes().to_vec())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The host asks whether a withdrawal from the ledger's own account is
    /// authorized.
    Verification,
    #[default]
    Application,
}

/// Runs `method` against the ledger. Unknown methods answer `false`;
/// surplus arguments are ignored.
pub async fn invoke<S: Store>(
    ledger: &mut Ledger<S>,
    ctx: &CallContext,
    trigger: Trigger,
    method: &str,
    args: &[Value],
) -> Result<Value, Fault> {
    if trigger == Trigger::Verification {
        return Ok(Value::Bool(ledger.verify(ctx)));
    }

    match method {
        "balanceOf" => {
            let [account] = take_args::<1>(method, args)?;
            let account = account_arg(method, 0, account)?;
            integer(ledger.balance_of(&account).await?)
        }
        "decimals" => Ok(Value::Integer(DECIMALS.into())),
        "deploy" => Ok(Value::Bool(ledger.deploy().await?.into())),
        "mint" => {
            let [amount] = take_args::<1>(method, args)?;
            let amount = integer_arg(method, 0, amount)?;
            Ok(Value::Bool(ledger.mint(ctx, amount).await?.into()))
        }
        "name" => Ok(Value::String(NAME.to_string())),
        "symbol" => Ok(Value::String(SYMBOL.to_string())),
        "supportedStandards" => Ok(Value::Array(
            SUPPORTED_STANDARDS
                .iter()
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )),
        "totalSupply" => integer(ledger.total_supply().await?),
        "transfer" => {
            let [from, to, amount] = take_args::<3>(method, args)?;
            let from = account_arg(method, 0, from)?;
            let to = account_arg(method, 1, to)?;
            let amount = integer_arg(method, 2, amount)?;
            Ok(Value::Bool(
                ledger.transfer(ctx, &from, &to, amount).await?.into(),
            ))
        }
        _ => {
            debug!("Unknown method {}", method);
            Ok(Value::Bool(false))
        }
    }
}

fn take_args<'a, const N: usize>(
    method: &str,
    args: &'a [Value],
) -> Result<&'a [Value; N], Fault> {
    args.get(..N)
        .and_then(|args| args.try_into().ok())
        .ok_or_else(|| Fault::ArgumentCount {
            method: method.to_string(),
            expected: N,
            got: args.len(),
        })
}

fn account_arg(method: &str, index: usize, value: &Value) -> Result<AccountId, Fault> {
    match value {
        Value::Bytes(bytes) => Ok(AccountId::try_from(bytes.as_slice())?),
        other => Err(type_fault(method, index, "bytes", other)),
    }
}

fn integer_arg(method: &str, index: usize, value: &Value) -> Result<i64, Fault> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(type_fault(method, index, "integer", other)),
    }
}

fn type_fault(method: &str, index: usize, expected: &'static str, got: &Value) -> Fault {
    debug!("{} argument {} is {}", method, index, got.kind());
    Fault::ArgumentType {
        method: method.to_string(),
        index,
        expected,
    }
}

fn integer(amount: u64) -> Result<Value, Fault> {
    i64::try_from(amount)
        .map(Value::Integer)
        .map_err(|_| Fault::Overflow)
}
