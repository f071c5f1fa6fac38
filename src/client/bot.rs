use std::sync::{Arc, OnceLock, Weak};

use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::bot::{BotController, BotHooks, NoHooks};
use crate::error::{Error, Result};
use crate::protocol::{
    Dispatcher, DisconnectNotice, Handshake, LocalAddressAllocator, LoginRequest,
    LoopbackAllocator, Transport, LOGOUT_REASON,
};
use crate::state::Session;
use super::config::BotConfig;
use super::lifecycle::Shared;
use super::outbound::{Flush, Outbound};
use super::{keepalive, receiver};

/// Loopback pool shared by every bot in the process that doesn't bring its own.
fn shared_loopback() -> Arc<dyn LocalAddressAllocator> {
    static POOL: OnceLock<Arc<LoopbackAllocator>> = OnceLock::new();
    POOL.get_or_init(|| Arc::new(LoopbackAllocator::new())).clone()
}

/// Builder for connecting a bot
pub struct BotBuilder {
    config: BotConfig,
    controller: Option<Weak<dyn BotController>>,
    hooks: Box<dyn BotHooks>,
    allocator: Option<Arc<dyn LocalAddressAllocator>>,
}

impl BotBuilder {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            controller: None,
            hooks: Box::new(NoHooks),
            allocator: None,
        }
    }

    /// Register a controller to be told when this bot goes away. Only a weak
    /// reference is kept.
    pub fn controller<C: BotController + 'static>(mut self, controller: &Arc<C>) -> Self {
        let weak = Arc::downgrade(controller) as Weak<dyn BotController>;
        self.controller = Some(weak);
        self
    }

    pub fn hooks(mut self, hooks: impl BotHooks) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn allocator(mut self, allocator: Arc<dyn LocalAddressAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub async fn connect(self) -> Result<Bot> {
        self.config.validate()?;

        let mut transport = Transport::new(self.config.host.clone(), self.config.port);
        if self.config.bind_local_address {
            let allocator = self.allocator.clone().unwrap_or_else(shared_loopback);
            transport = transport.with_allocator(allocator);
        }
        let stream = transport.connect().await?;
        stream.set_nodelay(true)?;

        let (reader, writer) = stream.into_split();
        self.start(reader, writer).await
    }

    /// Run a session over an already open stream pair: start the receive
    /// loop and the keepalive timer, then send the handshake.
    pub async fn start<R, W>(self, reader: R, writer: W) -> Result<Bot>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let name = self.config.name.clone();
        let shared = Arc::new(Shared::new(name.clone(), Outbound::new(writer), self.controller));

        let (status_tx, status) = watch::channel(Session::new());
        let login = LoginRequest {
            protocol_version: self.config.protocol_version,
            name: name.clone(),
        };
        let dispatcher = Dispatcher::new(
            BufReader::new(reader),
            login,
            Arc::clone(&shared),
            self.hooks,
            status_tx,
        );

        let receiver = tokio::spawn(receiver::run(dispatcher, Arc::clone(&shared)));
        let timer = keepalive::spawn(Arc::clone(&shared), self.config.keepalive_interval());
        shared.set_keepalive(timer.abort_handle());

        if let Err(e) = shared.send(&Handshake { name }, Flush::Now).await {
            shared.fail(&e);
            return Err(e);
        }
        info!(bot = %shared.name(), "connected");

        Ok(Bot { shared, status, receiver })
    }
}

/// Handle to a running bot session.
pub struct Bot {
    shared: Arc<Shared>,
    status: watch::Receiver<Session>,
    receiver: JoinHandle<Result<()>>,
}

impl Bot {
    pub fn name(&self) -> &str {
        self.shared.name()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    /// Latest session snapshot published by the receive loop.
    pub fn status(&self) -> Session {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.status.clone()
    }

    /// Leave the server. The session is terminated first; the notice to the
    /// server is best effort.
    pub async fn logout(&self) {
        self.shared.begin_logout();

        let notice = DisconnectNotice { reason: LOGOUT_REASON.into() };
        let sent = match self.shared.send(&notice, Flush::Now).await {
            Ok(()) => self.shared.outbound().shutdown().await,
            Err(e) => Err(e),
        };
        match sent {
            Ok(()) => info!(bot = %self.shared.name(), "logged out"),
            Err(e) => debug!(bot = %self.shared.name(), "logout notice not sent ({e})"),
        }
    }

    /// Wait for the receive loop to finish and return how the session ended.
    pub async fn join(self) -> Result<()> {
        match self.receiver.await {
            Ok(result) => result,
            Err(e) => {
                self.shared.die();
                Err(Error::Io(format!("receive loop aborted: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    use crate::bot::BotRegistry;
    use crate::protocol::OutboundMessage;

    struct Server {
        to_bot: DuplexStream,
        from_bot: DuplexStream,
    }

    async fn start_bot(builder: BotBuilder) -> (Bot, Server) {
        let (bot_reader, to_bot) = tokio::io::duplex(4096);
        let (bot_writer, from_bot) = tokio::io::duplex(4096);
        let bot = builder.start(bot_reader, bot_writer).await.unwrap();
        (bot, Server { to_bot, from_bot })
    }

    /// Next byte that isn't a keepalive.
    async fn next_opcode(stream: &mut DuplexStream) -> u8 {
        loop {
            let byte = stream.read_u8().await.unwrap();
            if byte != 0x00 {
                return byte;
            }
        }
    }

    #[tokio::test]
    async fn test_start_sends_handshake() {
        let (bot, mut server) = start_bot(BotBuilder::new(BotConfig::default())).await;
        assert!(bot.is_connected());
        assert_eq!(bot.name(), "Bot1");

        assert_eq!(next_opcode(&mut server.from_bot).await, 0x02);
        let mut name = [0u8; 10];
        server.from_bot.read_exact(&mut name).await.unwrap();
        assert_eq!(name, [0x00, 0x04, 0x00, b'B', 0x00, b'o', 0x00, b't', 0x00, b'1']);
    }

    #[tokio::test]
    async fn test_logout_notifies_server_and_registry() {
        let registry = Arc::new(BotRegistry::new());
        assert!(registry.register("Bot1"));

        let builder = BotBuilder::new(BotConfig::default()).controller(&registry);
        let (bot, mut server) = start_bot(builder).await;

        bot.logout().await;
        assert!(!bot.is_connected());
        assert!(!registry.contains("Bot1"));

        let mut sent = Vec::new();
        server.from_bot.read_to_end(&mut sent).await.unwrap();
        let notice = DisconnectNotice { reason: LOGOUT_REASON.into() }.encode().unwrap();
        assert!(sent.ends_with(&notice));

        drop(server.to_bot);
        assert!(bot.join().await.is_ok());
    }

    #[tokio::test]
    async fn test_kick_ends_session_with_reason() {
        let registry = Arc::new(BotRegistry::new());
        registry.register("Bot1");
        let builder = BotBuilder::new(BotConfig::default()).controller(&registry);
        let (bot, mut server) = start_bot(builder).await;

        server
            .to_bot
            .write_all(&[0xff, 0x00, 0x04, 0x00, b'b', 0x00, b'a', 0x00, b'n', 0x00, b'!'])
            .await
            .unwrap();

        let err = bot.join().await.unwrap_err();
        assert!(matches!(err, Error::Disconnected { ref reason } if reason == "ban!"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_status_follows_session() {
        let (bot, mut server) = start_bot(BotBuilder::new(BotConfig::default())).await;
        let mut status = bot.subscribe();

        server.to_bot.write_all(&[0x08, 0x00, 0x11]).await.unwrap();
        let snapshot = *status.wait_for(|s| s.last_opcode == 0x08).await.unwrap();
        assert_eq!(snapshot.health, 17);
        assert!(!snapshot.ready);
        assert_eq!(bot.status().health, 17);
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_config() {
        let config = BotConfig::new("127.0.0.1", 1, "");
        assert!(matches!(BotBuilder::new(config).connect().await, Err(Error::InvalidConfig(_))));
    }
}
