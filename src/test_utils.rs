use std::{net::TcpListener, sync::Arc};

use anyhow::Result;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    api::Env,
    config::Config,
    database::{self, Reader, Writer},
    event::EventSubscriber,
    ledger::{AccountId, CallContext, Ledger, LedgerConfig, MemoryStore},
};

pub const AUTHORITY: AccountId = AccountId::new([0xaa; 20]);

/// A distinct non-authority account per `n`.
pub fn account(n: u8) -> AccountId {
    let mut bytes = [n; 20];
    bytes[0] = 0x01;
    AccountId::new(bytes)
}

pub fn authority_ctx() -> CallContext {
    CallContext::signed_by(AUTHORITY)
}

pub fn new_memory_ledger() -> Ledger<MemoryStore> {
    Ledger::new(LedgerConfig::new(AUTHORITY), MemoryStore::new())
}

pub async fn new_deployed_memory_ledger() -> Result<Ledger<MemoryStore>> {
    let mut ledger = new_memory_ledger();
    ledger.deploy().await?;
    Ok(ledger)
}

pub async fn new_test_db() -> Result<(Config, Reader, Writer, TempDir)> {
    let temp_dir = TempDir::new()?;
    let config = Config::new_test(temp_dir.path().to_path_buf(), AUTHORITY);
    let writer = Writer::new(&config, database::FILENAME).await?;
    let reader = Reader::new(config.clone(), database::FILENAME).await?;
    Ok((config, reader, writer, temp_dir))
}

/// Wires a SQL-backed ledger into an API environment.
pub async fn new_test_env() -> Result<(Env, TempDir)> {
    let (config, reader, writer, temp_dir) = new_test_db().await?;
    let event_subscriber = EventSubscriber::new();
    let ledger = Ledger::new(config.ledger_config()?, writer.store())
        .with_subscriber(event_subscriber.clone());
    let env = Env {
        config,
        cancel_token: CancellationToken::new(),
        reader,
        ledger: Arc::new(Mutex::new(ledger)),
        event_subscriber,
    };
    Ok((env, temp_dir))
}

pub fn free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
