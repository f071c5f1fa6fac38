/// Every packet id this client understands. The catalog is closed: any byte
/// not listed here cannot be framed and ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    KeepAlive = 0x00,
    Login = 0x01,
    Handshake = 0x02,
    Chat = 0x03,
    TimeUpdate = 0x04,
    EntityEquipment = 0x05,
    SpawnPosition = 0x06,
    UseEntity = 0x07,
    UpdateHealth = 0x08,
    Respawn = 0x09,
    Player = 0x0a,
    PlayerPosition = 0x0b,
    PlayerLook = 0x0c,
    PlayerPositionLook = 0x0d,
    PlayerDigging = 0x0e,
    PlayerBlockPlacement = 0x0f,
    HoldingChange = 0x10,
    UseBed = 0x11,
    Animation = 0x12,
    EntityAction = 0x13,
    NamedEntitySpawn = 0x14,
    PickupSpawn = 0x15,
    CollectItem = 0x16,
    AddObject = 0x17,
    MobSpawn = 0x18,
    Painting = 0x19,
    StanceUpdate = 0x1b,
    EntityVelocity = 0x1c,
    DestroyEntity = 0x1d,
    Entity = 0x1e,
    EntityRelativeMove = 0x1f,
    EntityLook = 0x20,
    EntityLookAndRelativeMove = 0x21,
    EntityTeleport = 0x22,
    EntityStatus = 0x26,
    AttachEntity = 0x27,
    EntityMetadata = 0x28,
    PreChunk = 0x32,
    MapChunk = 0x33,
    MultiBlockChange = 0x34,
    BlockChange = 0x35,
    BlockAction = 0x36,
    Explosion = 0x3c,
    SoundEffect = 0x3d,
    NewState = 0x46,
    Thunderbolt = 0x47,
    OpenWindow = 0x64,
    CloseWindow = 0x65,
    WindowClick = 0x66,
    SetSlot = 0x67,
    WindowItems = 0x68,
    UpdateProgressBar = 0x69,
    Transaction = 0x6a,
    UpdateSign = 0x82,
    ItemData = 0x83,
    IncrementStatistic = 0xc8,
    ModLoaderMp = 0xe6,
    Disconnect = 0xff,
}

/// How the dispatcher consumes an opcode's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Exactly this many bytes, discarded unread.
    Fixed(usize),
    /// Needs field-by-field decoding: counts, optional trailers, strings,
    /// metadata, or a side effect on the session.
    Decoded,
}

impl Opcode {
    pub const ALL: [Opcode; 58] = [
        Self::KeepAlive, Self::Login, Self::Handshake, Self::Chat, Self::TimeUpdate,
        Self::EntityEquipment, Self::SpawnPosition, Self::UseEntity, Self::UpdateHealth,
        Self::Respawn, Self::Player, Self::PlayerPosition, Self::PlayerLook,
        Self::PlayerPositionLook, Self::PlayerDigging, Self::PlayerBlockPlacement,
        Self::HoldingChange, Self::UseBed, Self::Animation, Self::EntityAction,
        Self::NamedEntitySpawn, Self::PickupSpawn, Self::CollectItem, Self::AddObject,
        Self::MobSpawn, Self::Painting, Self::StanceUpdate, Self::EntityVelocity,
        Self::DestroyEntity, Self::Entity, Self::EntityRelativeMove, Self::EntityLook,
        Self::EntityLookAndRelativeMove, Self::EntityTeleport, Self::EntityStatus,
        Self::AttachEntity, Self::EntityMetadata, Self::PreChunk, Self::MapChunk,
        Self::MultiBlockChange, Self::BlockChange, Self::BlockAction, Self::Explosion,
        Self::SoundEffect, Self::NewState, Self::Thunderbolt, Self::OpenWindow,
        Self::CloseWindow, Self::WindowClick, Self::SetSlot, Self::WindowItems,
        Self::UpdateProgressBar, Self::Transaction, Self::UpdateSign, Self::ItemData,
        Self::IncrementStatistic, Self::ModLoaderMp, Self::Disconnect,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x00 => Some(Self::KeepAlive),
            0x01 => Some(Self::Login),
            0x02 => Some(Self::Handshake),
            0x03 => Some(Self::Chat),
            0x04 => Some(Self::TimeUpdate),
            0x05 => Some(Self::EntityEquipment),
            0x06 => Some(Self::SpawnPosition),
            0x07 => Some(Self::UseEntity),
            0x08 => Some(Self::UpdateHealth),
            0x09 => Some(Self::Respawn),
            0x0a => Some(Self::Player),
            0x0b => Some(Self::PlayerPosition),
            0x0c => Some(Self::PlayerLook),
            0x0d => Some(Self::PlayerPositionLook),
            0x0e => Some(Self::PlayerDigging),
            0x0f => Some(Self::PlayerBlockPlacement),
            0x10 => Some(Self::HoldingChange),
            0x11 => Some(Self::UseBed),
            0x12 => Some(Self::Animation),
            0x13 => Some(Self::EntityAction),
            0x14 => Some(Self::NamedEntitySpawn),
            0x15 => Some(Self::PickupSpawn),
            0x16 => Some(Self::CollectItem),
            0x17 => Some(Self::AddObject),
            0x18 => Some(Self::MobSpawn),
            0x19 => Some(Self::Painting),
            0x1b => Some(Self::StanceUpdate),
            0x1c => Some(Self::EntityVelocity),
            0x1d => Some(Self::DestroyEntity),
            0x1e => Some(Self::Entity),
            0x1f => Some(Self::EntityRelativeMove),
            0x20 => Some(Self::EntityLook),
            0x21 => Some(Self::EntityLookAndRelativeMove),
            0x22 => Some(Self::EntityTeleport),
            0x26 => Some(Self::EntityStatus),
            0x27 => Some(Self::AttachEntity),
            0x28 => Some(Self::EntityMetadata),
            0x32 => Some(Self::PreChunk),
            0x33 => Some(Self::MapChunk),
            0x34 => Some(Self::MultiBlockChange),
            0x35 => Some(Self::BlockChange),
            0x36 => Some(Self::BlockAction),
            0x3c => Some(Self::Explosion),
            0x3d => Some(Self::SoundEffect),
            0x46 => Some(Self::NewState),
            0x47 => Some(Self::Thunderbolt),
            0x64 => Some(Self::OpenWindow),
            0x65 => Some(Self::CloseWindow),
            0x66 => Some(Self::WindowClick),
            0x67 => Some(Self::SetSlot),
            0x68 => Some(Self::WindowItems),
            0x69 => Some(Self::UpdateProgressBar),
            0x6a => Some(Self::Transaction),
            0x82 => Some(Self::UpdateSign),
            0x83 => Some(Self::ItemData),
            0xc8 => Some(Self::IncrementStatistic),
            0xe6 => Some(Self::ModLoaderMp),
            0xff => Some(Self::Disconnect),
            _ => None,
        }
    }

    pub fn payload(self) -> Payload {
        match self {
            Self::KeepAlive => Payload::Fixed(0),
            Self::TimeUpdate => Payload::Fixed(8),
            // entity id, slot, item id, damage
            Self::EntityEquipment => Payload::Fixed(10),
            Self::SpawnPosition => Payload::Fixed(12),
            Self::UseEntity => Payload::Fixed(10),
            Self::Player => Payload::Fixed(1),
            Self::PlayerPosition => Payload::Fixed(33),
            Self::PlayerLook => Payload::Fixed(9),
            Self::PlayerDigging => Payload::Fixed(11),
            Self::HoldingChange => Payload::Fixed(2),
            Self::UseBed => Payload::Fixed(14),
            Self::Animation => Payload::Fixed(5),
            Self::EntityAction => Payload::Fixed(5),
            Self::PickupSpawn => Payload::Fixed(24),
            Self::CollectItem => Payload::Fixed(8),
            Self::StanceUpdate => Payload::Fixed(18),
            Self::EntityVelocity => Payload::Fixed(10),
            Self::DestroyEntity => Payload::Fixed(4),
            Self::Entity => Payload::Fixed(4),
            Self::EntityRelativeMove => Payload::Fixed(7),
            Self::EntityLook => Payload::Fixed(6),
            Self::EntityLookAndRelativeMove => Payload::Fixed(9),
            Self::EntityTeleport => Payload::Fixed(18),
            Self::EntityStatus => Payload::Fixed(5),
            Self::AttachEntity => Payload::Fixed(8),
            Self::PreChunk => Payload::Fixed(9),
            Self::BlockChange => Payload::Fixed(11),
            Self::BlockAction => Payload::Fixed(12),
            Self::SoundEffect => Payload::Fixed(17),
            Self::NewState => Payload::Fixed(1),
            Self::Thunderbolt => Payload::Fixed(17),
            Self::CloseWindow => Payload::Fixed(1),
            Self::UpdateProgressBar => Payload::Fixed(5),
            Self::Transaction => Payload::Fixed(4),
            Self::IncrementStatistic => Payload::Fixed(5),

            Self::Login
            | Self::Handshake
            | Self::Chat
            | Self::UpdateHealth
            | Self::Respawn
            | Self::PlayerPositionLook
            | Self::PlayerBlockPlacement
            | Self::NamedEntitySpawn
            | Self::AddObject
            | Self::MobSpawn
            | Self::Painting
            | Self::EntityMetadata
            | Self::MapChunk
            | Self::MultiBlockChange
            | Self::Explosion
            | Self::OpenWindow
            | Self::WindowClick
            | Self::SetSlot
            | Self::WindowItems
            | Self::UpdateSign
            | Self::ItemData
            | Self::ModLoaderMp
            | Self::Disconnect => Payload::Decoded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_matches_discriminants() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_u8(op as u8), Some(op));
        }
    }

    #[test]
    fn test_catalog_is_closed() {
        let known = (0..=255u8).filter(|b| Opcode::from_u8(*b).is_some()).count();
        assert_eq!(known, Opcode::ALL.len());
        assert_eq!(Opcode::from_u8(0x1a), None);
        assert_eq!(Opcode::from_u8(0x4f), None);
    }

    /// Fixed payload sizes as real servers send them.
    const FIXED_SIZES: [(u8, usize); 35] = [
        (0x00, 0), (0x04, 8), (0x05, 10), (0x06, 12), (0x07, 10), (0x0a, 1),
        (0x0b, 33), (0x0c, 9), (0x0e, 11), (0x10, 2), (0x11, 14), (0x12, 5),
        (0x13, 5), (0x15, 24), (0x16, 8), (0x1b, 18), (0x1c, 10), (0x1d, 4),
        (0x1e, 4), (0x1f, 7), (0x20, 6), (0x21, 9), (0x22, 18), (0x26, 5),
        (0x27, 8), (0x32, 9), (0x35, 11), (0x36, 12), (0x3d, 17), (0x46, 1),
        (0x47, 17), (0x65, 1), (0x69, 5), (0x6a, 4), (0xc8, 5),
    ];

    #[test]
    fn test_fixed_sizes_match_wire() {
        for (raw, len) in FIXED_SIZES {
            let op = Opcode::from_u8(raw).unwrap();
            assert_eq!(op.payload(), Payload::Fixed(len), "{op:?} ({raw:#04x})");
        }
        let fixed = Opcode::ALL
            .iter()
            .filter(|op| matches!(op.payload(), Payload::Fixed(_)))
            .count();
        assert_eq!(fixed, FIXED_SIZES.len());
    }

    #[test]
    fn test_payload_sizes() {
        assert_eq!(Opcode::KeepAlive.payload(), Payload::Fixed(0));
        assert_eq!(Opcode::PlayerPosition.payload(), Payload::Fixed(33));
        assert_eq!(Opcode::BlockChange.payload(), Payload::Fixed(11));
        assert_eq!(Opcode::SoundEffect.payload(), Payload::Fixed(17));
        assert_eq!(Opcode::MapChunk.payload(), Payload::Decoded);
        assert_eq!(Opcode::Disconnect.payload(), Payload::Decoded);
    }
}
