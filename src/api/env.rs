use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    database::{self, SqlStore},
    event::EventSubscriber,
    ledger::Ledger,
};

#[derive(Clone)]
pub struct Env {
    pub config: Config,
    pub cancel_token: CancellationToken,
    pub reader: database::Reader,
    pub ledger: Arc<Mutex<Ledger<SqlStore>>>,
    pub event_subscriber: EventSubscriber,
}
