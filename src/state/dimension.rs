/// World the bot currently occupies, as carried in login and respawn packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dimension {
    #[default]
    Earth,
    Nether,
    /// Any id this client has no name for; kept so it can be echoed back.
    Other(i8),
}

impl Dimension {
    pub fn from_id(id: i8) -> Self {
        match id {
            0 => Self::Earth,
            -1 => Self::Nether,
            other => Self::Other(other),
        }
    }

    pub fn id(self) -> i8 {
        match self {
            Self::Earth => 0,
            Self::Nether => -1,
            Self::Other(id) => id,
        }
    }
}
