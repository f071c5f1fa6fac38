use crate::state::Position;

/// Extension points the receive loop calls while dispatching.
///
/// Both run on the receive loop itself, so they must not block.
pub trait BotHooks: Send + 'static {
    /// Called with every accepted position sync, before it is applied.
    fn position_update(&mut self, _x: f64, _y: f64, _z: f64) {}

    /// Called once, when the session becomes ready. Any change made to
    /// `position` is sent to the server immediately.
    fn ready(&mut self, _position: &mut Position) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl BotHooks for NoHooks {}
