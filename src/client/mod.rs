pub mod config;
pub mod bot;
pub mod lifecycle;
pub mod outbound;
pub mod keepalive;
pub mod receiver;

pub use config::BotConfig;
pub use bot::{Bot, BotBuilder};
pub use outbound::{Flush, Outbound};
pub use keepalive::KEEPALIVE_INTERVAL;
