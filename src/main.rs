use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use peet::{
    api::{self, Env},
    config::Config,
    database,
    event::EventSubscriber,
    ledger::Ledger,
    logging, stopper,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::try_parse()?;
    logging::setup(config.log_format);
    info!("Peet");
    info!("{:#?}", config);
    let ledger_config = config.ledger_config()?;

    let cancel_token = CancellationToken::new();
    let mut handles = vec![];
    handles.push(stopper::run(cancel_token.clone()));

    let writer = database::Writer::new(&config, database::FILENAME).await?;
    let reader = database::Reader::new(config.clone(), database::FILENAME).await?;

    let event_subscriber = EventSubscriber::new();
    let ledger =
        Ledger::new(ledger_config, writer.store()).with_subscriber(event_subscriber.clone());

    handles.push(
        api::run(Env {
            config: config.clone(),
            cancel_token: cancel_token.clone(),
            reader,
            ledger: Arc::new(Mutex::new(ledger)),
            event_subscriber,
        })
        .await?,
    );

    for handle in handles {
        let _ = handle.await;
    }
    info!("Exited");
    Ok(())
}
