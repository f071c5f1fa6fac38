use std::sync::Arc;

use tokio::io::AsyncRead;

use crate::error::Result;
use crate::protocol::Dispatcher;
use super::lifecycle::Shared;

/// Drive the dispatcher until the session ends.
///
/// Deferred replies and keepalives are flushed after every packet. Any error
/// terminates the session; once a logout is under way the resulting error is
/// expected and the loop ends cleanly.
pub async fn run<R>(mut dispatcher: Dispatcher<R>, shared: Arc<Shared>) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    while shared.is_connected() {
        let step = match dispatcher.next_packet().await {
            Ok(()) => shared.outbound().flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = step {
            shared.fail(&e);
            if shared.expects_disconnect() {
                return Ok(());
            }
            return Err(e);
        }
    }
    tracing::debug!(bot = %shared.name(), "receive loop stopped");
    Ok(())
}
