use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::ledger::AccountId;

/// A credit to `to`. `from` is `None` when the tokens were newly issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transferred {
    pub from: Option<AccountId>,
    pub to: AccountId,
    pub amount: u64,
}

#[derive(Debug, Clone)]
pub struct EventSubscriber {
    pub sender: broadcast::Sender<Transferred>,
}

impl EventSubscriber {
    pub fn new() -> Self {
        Self {
            sender: broadcast::Sender::new(100),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Transferred> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Transferred) {
        // no receivers is fine
        let _ = self.sender.send(event);
    }
}
