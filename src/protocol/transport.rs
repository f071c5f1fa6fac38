use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::net::{TcpSocket, TcpStream};

use crate::error::{Error, Result};

/// Supplies local source addresses so many bots on one host look like
/// distinct peers. A failure here is never fatal; the connection falls back
/// to the default route.
pub trait LocalAddressAllocator: Send + Sync {
    fn next_address(&self) -> Result<IpAddr>;
}

const LOOPBACK_FIRST: u32 = u32::from_be_bytes([127, 0, 0, 2]);
const LOOPBACK_LAST: u32 = u32::from_be_bytes([127, 255, 255, 254]);

/// Round-robin over the loopback block, starting at 127.0.0.2.
#[derive(Debug)]
pub struct LoopbackAllocator {
    next: AtomicU32,
}

impl LoopbackAllocator {
    pub fn new() -> Self {
        Self { next: AtomicU32::new(LOOPBACK_FIRST) }
    }

    pub fn starting_at(addr: Ipv4Addr) -> Result<Self> {
        let raw = u32::from(addr);
        if !(LOOPBACK_FIRST..=LOOPBACK_LAST).contains(&raw) {
            return Err(Error::InvalidConfig(format!("{addr} is outside the loopback pool")));
        }
        Ok(Self { next: AtomicU32::new(raw) })
    }
}

impl Default for LoopbackAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAddressAllocator for LoopbackAllocator {
    fn next_address(&self) -> Result<IpAddr> {
        let current = self.next.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |raw| {
            Some(if raw >= LOOPBACK_LAST { LOOPBACK_FIRST } else { raw + 1 })
        });
        // the closure never returns None
        let raw = current.unwrap_or_else(|raw| raw);
        Ok(IpAddr::V4(Ipv4Addr::from(raw)))
    }
}

/// Opens the TCP stream to the game server.
pub struct Transport {
    host: String,
    port: u16,
    allocator: Option<Arc<dyn LocalAddressAllocator>>,
}

impl Transport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            allocator: None,
        }
    }

    pub fn with_allocator(mut self, allocator: Arc<dyn LocalAddressAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub async fn resolve(&self) -> Result<SocketAddr> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| Error::Io(format!("no address for {}:{}", self.host, self.port)))
    }

    /// Connect from an allocated local address if possible, otherwise from
    /// whatever address the OS picks.
    pub async fn connect(&self) -> Result<TcpStream> {
        let server = self.resolve().await?;

        if let Some(allocator) = &self.allocator {
            match connect_from(server, allocator.as_ref()).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    tracing::debug!(%server, "bound connect failed ({e}), retrying unbound");
                }
            }
        }

        Ok(TcpStream::connect(server).await?)
    }
}

async fn connect_from(server: SocketAddr, allocator: &dyn LocalAddressAllocator) -> Result<TcpStream> {
    let local = allocator.next_address()?;
    let socket = match server {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.bind(SocketAddr::new(local, 0))?;
    Ok(socket.connect(server).await?)
}
