pub mod controller;
pub mod hooks;

pub use controller::{BotController, BotRegistry};
pub use hooks::{BotHooks, NoHooks};
