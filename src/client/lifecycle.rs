use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, Weak};

use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::bot::BotController;
use crate::error::{Error, Result};
use crate::protocol::OutboundMessage;
use super::outbound::{Flush, Outbound};

/// State shared by the receive loop, the keepalive timer and the `Bot`
/// handle. Everything else about the session lives on the receive loop.
pub struct Shared {
    name: String,
    connected: AtomicBool,
    expect_disconnect: AtomicBool,
    deregistered: AtomicBool,
    keepalive: Mutex<Option<AbortHandle>>,
    controller: Option<Weak<dyn BotController>>,
    outbound: Outbound,
}

impl Shared {
    /// A freshly opened session; it starts out connected.
    pub fn new(
        name: impl Into<String>,
        outbound: Outbound,
        controller: Option<Weak<dyn BotController>>,
    ) -> Self {
        Self {
            name: name.into(),
            connected: AtomicBool::new(true),
            expect_disconnect: AtomicBool::new(false),
            deregistered: AtomicBool::new(false),
            keepalive: Mutex::new(None),
            controller,
            outbound,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn expects_disconnect(&self) -> bool {
        self.expect_disconnect.load(Ordering::SeqCst)
    }

    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    pub async fn send<M: OutboundMessage + ?Sized>(&self, message: &M, flush: Flush) -> Result<()> {
        self.outbound.send(message, flush).await
    }

    /// Hand over the keepalive task so termination can cancel it. If the
    /// session already ended, the task is cancelled right away.
    pub fn set_keepalive(&self, handle: AbortHandle) {
        let mut slot = self.keepalive.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_connected() {
            *slot = Some(handle);
        } else {
            handle.abort();
        }
    }

    /// Mark the coming disconnect as intentional, then terminate.
    pub fn begin_logout(&self) {
        self.expect_disconnect.store(true, Ordering::SeqCst);
        self.die();
    }

    /// Terminate the session: cancel the keepalive timer, clear `connected`
    /// and leave the controller's registry. Safe to call any number of times.
    ///
    /// A receive loop blocked in a read only notices once that read returns.
    pub fn die(&self) {
        // cleared before taking the handle so set_keepalive cannot store one after
        self.connected.store(false, Ordering::SeqCst);
        let handle = self.keepalive.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            handle.abort();
        }

        if !self.deregistered.swap(true, Ordering::SeqCst) {
            if let Some(controller) = self.controller.as_ref().and_then(Weak::upgrade) {
                controller.remove(&self.name);
            }
        }
    }

    /// Terminate because of `err`, logging it unless a logout is under way.
    pub fn fail(&self, err: &Error) {
        self.die();
        if self.expects_disconnect() {
            debug!(bot = %self.name, "connection closed after logout ({err})");
        } else {
            warn!(bot = %self.name, "bot died ({err})");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingController {
        removed: AtomicUsize,
    }

    impl BotController for CountingController {
        fn remove(&self, name: &str) {
            assert_eq!(name, "Bot1");
            self.removed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn shared_with(controller: &Arc<CountingController>) -> Shared {
        let weak = Arc::downgrade(controller) as Weak<dyn BotController>;
        Shared::new("Bot1", Outbound::new(tokio::io::sink()), Some(weak))
    }

    #[test]
    fn test_die_is_idempotent() {
        let controller = Arc::new(CountingController::default());
        let shared = shared_with(&controller);
        assert!(shared.is_connected());

        shared.die();
        shared.die();
        shared.fail(&Error::UnexpectedEof);

        assert!(!shared.is_connected());
        assert_eq!(controller.removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_controller_is_skipped() {
        let controller = Arc::new(CountingController::default());
        let shared = shared_with(&controller);
        drop(controller);
        shared.die();
        assert!(!shared.is_connected());
    }

    #[test]
    fn test_logout_sets_expect_disconnect() {
        let shared = Shared::new("Bot1", Outbound::new(tokio::io::sink()), None);
        assert!(!shared.expects_disconnect());
        shared.begin_logout();
        assert!(shared.expects_disconnect());
        assert!(!shared.is_connected());
    }

    #[tokio::test]
    async fn test_die_cancels_keepalive() {
        let shared = Shared::new("Bot1", Outbound::new(tokio::io::sink()), None);
        let task = tokio::spawn(std::future::pending::<()>());
        shared.set_keepalive(task.abort_handle());

        shared.die();
        assert!(task.await.unwrap_err().is_cancelled());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_keepalive_racing_die_is_always_cancelled() {
        for _ in 0..200 {
            let shared = Shared::new("Bot1", Outbound::new(tokio::io::sink()), None);
            let task = tokio::spawn(std::future::pending::<()>());
            let handle = task.abort_handle();

            std::thread::scope(|s| {
                s.spawn(|| shared.set_keepalive(handle));
                s.spawn(|| shared.die());
            });
            assert!(task.await.unwrap_err().is_cancelled());
        }
    }

    #[tokio::test]
    async fn test_late_keepalive_is_cancelled() {
        let shared = Shared::new("Bot1", Outbound::new(tokio::io::sink()), None);
        shared.die();

        let task = tokio::spawn(std::future::pending::<()>());
        shared.set_keepalive(task.abort_handle());
        assert!(task.await.unwrap_err().is_cancelled());
    }
}
