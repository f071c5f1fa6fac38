use super::{Dimension, Position};

/// Connection state owned by the receive loop.
///
/// A copy is published after every dispatched packet so other tasks can
/// observe the bot without touching the live value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Session {
    /// Set once, by the first position sync from the server.
    pub ready: bool,
    /// Most recently reported health.
    pub health: i16,
    /// Last opcode dispatched successfully; only used in diagnostics.
    pub last_opcode: u8,
    pub position: Position,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension(&self) -> Dimension {
        self.position.dimension
    }
}
