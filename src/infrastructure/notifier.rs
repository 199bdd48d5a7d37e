use crate::domain::events::{LedgerEvent, TRANSACTION_ROLLBACK};
use crate::domain::ports::EventNotifier;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Writes lifecycle events to the log. Default notifier for the binary.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

#[async_trait]
impl EventNotifier for TracingNotifier {
    async fn notify(&self, event: &LedgerEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        if event.name == TRANSACTION_ROLLBACK {
            warn!(event = event.name, %payload, "ledger event");
        } else {
            info!(event = event.name, %payload, "ledger event");
        }
        Ok(())
    }
}

/// Keeps every event in memory, in delivery order.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<RwLock<Vec<LedgerEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().await.clone()
    }

    pub async fn names(&self) -> Vec<&'static str> {
        self.events.read().await.iter().map(|e| e.name).collect()
    }
}

#[async_trait]
impl EventNotifier for RecordingNotifier {
    async fn notify(&self, event: &LedgerEvent) -> Result<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}
