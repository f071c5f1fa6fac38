pub mod dimension;
pub mod position;
pub mod session;

pub use dimension::Dimension;
pub use position::Position;
pub use session::Session;
