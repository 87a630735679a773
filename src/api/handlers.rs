use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    database::types::{BalanceRow, ContractRow, TransferQuery, TransferRow},
    dispatch::{self, Trigger, Value},
    ledger::{
        AccountId, CallContext, ContractInfo,
        metadata::{DECIMALS, NAME, SUPPORTED_STANDARDS, SYMBOL},
    },
};

use super::{
    Env,
    error::{Error, HttpError},
    result::Result,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Info {
    pub version: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub supported_standards: Vec<String>,
    pub authority: AccountId,
    pub total_supply: u64,
    pub max_supply: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Supply {
    pub total_supply: u64,
    pub max_supply: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub method: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub context: CallContext,
    #[serde(default)]
    pub trigger: Trigger,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransfersQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub account: Option<String>,
}

fn parse_account(s: &str) -> std::result::Result<AccountId, Error> {
    s.parse::<AccountId>()
        .map_err(|e| HttpError::BadRequest(format!("account {}: {}", s, e)).into())
}

fn max_supply(env: &Env) -> anyhow::Result<u64> {
    Ok(env.config.ledger_config()?.supply_cap()?)
}

pub async fn get_index(State(env): State<Env>) -> Result<Info> {
    Ok(Info {
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: NAME.to_string(),
        symbol: SYMBOL.to_string(),
        decimals: DECIMALS,
        supported_standards: SUPPORTED_STANDARDS.iter().map(|s| s.to_string()).collect(),
        authority: env.config.authority,
        total_supply: env.reader.total_supply().await?,
        max_supply: max_supply(&env)?,
    }
    .into())
}

pub async fn get_health(State(env): State<Env>) -> Result<Health> {
    let _conn = env.reader.connection().await?;
    Ok(Health {
        status: "ok".to_string(),
    }
    .into())
}

pub async fn post_invoke(
    State(env): State<Env>,
    Json(request): Json<InvokeRequest>,
) -> Result<Value> {
    // runs to completion even if the request is dropped mid transaction
    let ledger = env.ledger.clone();
    let result = tokio::spawn(async move {
        let mut ledger = ledger.lock().await;
        dispatch::invoke(
            &mut *ledger,
            &request.context,
            request.trigger,
            &request.method,
            &request.args,
        )
        .await
    })
    .await?;
    result.map(Into::into).map_err(Error::from_fault)
}

pub async fn get_balances(State(env): State<Env>) -> Result<Vec<BalanceRow>> {
    Ok(env.reader.balances().await?.into())
}

pub async fn get_balance(
    State(env): State<Env>,
    Path(account): Path<String>,
) -> Result<BalanceRow> {
    let account = parse_account(&account)?;
    let amount = env.reader.balance(&account).await?;
    Ok(BalanceRow::builder()
        .account(account)
        .amount(amount)
        .build()
        .into())
}

pub async fn get_supply(State(env): State<Env>) -> Result<Supply> {
    Ok(Supply {
        total_supply: env.reader.total_supply().await?,
        max_supply: max_supply(&env)?,
    }
    .into())
}

pub async fn get_transfers(
    State(env): State<Env>,
    Query(query): Query<TransfersQuery>,
) -> Result<Vec<TransferRow>> {
    let account = query.account.as_deref().map(parse_account).transpose()?;
    let page = TransferQuery {
        offset: query.offset,
        limit: query.limit,
    };
    Ok(env.reader.transfers(account.as_ref(), page).await?.into())
}

pub async fn post_contract(
    State(env): State<Env>,
    Json(row): Json<ContractRow>,
) -> Result<ContractRow> {
    // shares the writer connection, so wait out any running invocation
    let ledger = env.ledger.lock().await;
    ledger
        .store()
        .register_contract(
            row.account,
            ContractInfo {
                payable: row.payable,
            },
        )
        .await?;
    Ok(row.into())
}

pub async fn get_contract(
    State(env): State<Env>,
    Path(account): Path<String>,
) -> Result<ContractRow> {
    let account = parse_account(&account)?;
    match env.reader.contract(&account).await? {
        Some(row) => Ok(row.into()),
        None => Err(HttpError::NotFound(format!("contract {}", account)).into()),
    }
}
