pub mod opcode;
pub mod message;
pub mod dispatch;
pub mod transport;

pub use opcode::{Opcode, Payload};
pub use message::{
    OutboundMessage, Handshake, LoginRequest, RespawnRequest, KeepAlive,
    DisconnectNotice, PROTOCOL_VERSION, LOGOUT_REASON,
};
pub use dispatch::Dispatcher;
pub use transport::{Transport, LocalAddressAllocator, LoopbackAllocator};
