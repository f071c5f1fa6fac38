use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::Error;
use crate::protocol::KeepAlive;
use super::lifecycle::Shared;
use super::outbound::Flush;

pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Send a keepalive right away and then every `period` until the session
/// ends. The message stays buffered until the receive loop next flushes.
pub fn spawn(shared: Arc<Shared>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !shared.is_connected() {
                break;
            }
            if let Err(e) = shared.send(&KeepAlive, Flush::Deferred).await {
                shared.fail(&Error::KeepAliveFailed(e.to_string()));
                break;
            }
            tracing::trace!(bot = %shared.name(), "keepalive queued");
        }
    })
}
