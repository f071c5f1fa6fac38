//! Synthetic player client
//!
//! Connects scripted bots to a legacy beta-protocol game server, keeps the
//! session alive and answers the handful of packets a player has to answer.

pub mod codec;
pub mod error;
pub mod protocol;
pub mod state;
pub mod client;
pub mod bot;

pub use error::{Error, Result};
pub use protocol::{Opcode, Transport, LocalAddressAllocator, LoopbackAllocator};
pub use state::{Dimension, Position, Session};
pub use client::{Bot, BotBuilder, BotConfig};
pub use bot::{BotController, BotRegistry, BotHooks, NoHooks};
