use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::sync::watch;
use tracing::{info, trace};

use crate::bot::BotHooks;
use crate::client::lifecycle::Shared;
use crate::client::outbound::Flush;
use crate::codec::PacketReader;
use crate::error::{Error, Result};
use crate::state::{Dimension, Session};
use super::message::{LoginRequest, RespawnRequest};
use super::opcode::{Opcode, Payload};

/// Item id meaning "empty slot"; no item fields follow it.
const NO_ITEM: i16 = -1;
/// Size of the fields after a present item id: count (byte) and damage (short).
const ITEM_TRAILER_LEN: usize = 3;

/// Decodes the inbound stream one packet at a time.
///
/// Every opcode consumes exactly its own bytes. There is no way to skip an
/// unknown packet, so any decode failure ends the session.
pub struct Dispatcher<R> {
    reader: PacketReader<R>,
    session: Session,
    login: LoginRequest,
    shared: Arc<Shared>,
    hooks: Box<dyn BotHooks>,
    status: watch::Sender<Session>,
}

impl<R: AsyncRead + Unpin> Dispatcher<R> {
    pub fn new(
        reader: R,
        login: LoginRequest,
        shared: Arc<Shared>,
        hooks: Box<dyn BotHooks>,
        status: watch::Sender<Session>,
    ) -> Self {
        Self {
            reader: PacketReader::new(reader),
            session: Session::new(),
            login,
            shared,
            hooks,
            status,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reader(&self) -> &PacketReader<R> {
        &self.reader
    }

    /// Block until the next opcode arrives, then dispatch it.
    pub async fn next_packet(&mut self) -> Result<()> {
        let opcode = self.reader.read_u8().await?;
        self.handle_packet(opcode).await
    }

    pub async fn handle_packet(&mut self, raw: u8) -> Result<()> {
        let opcode = Opcode::from_u8(raw).ok_or(Error::UnknownOpcode {
            opcode: raw,
            last: self.session.last_opcode,
        })?;
        trace!(bot = %self.shared.name(), ?opcode, "dispatch");

        match opcode.payload() {
            Payload::Fixed(n) => self.reader.skip(n).await?,
            Payload::Decoded => self.decode(opcode).await?,
        }

        self.session.last_opcode = raw;
        self.status.send_replace(self.session);
        Ok(())
    }

    async fn decode(&mut self, opcode: Opcode) -> Result<()> {
        let r = &mut self.reader;
        match opcode {
            Opcode::Handshake => {
                r.read_string().await?;
                self.shared.send(&self.login, Flush::Deferred).await?;
            }
            Opcode::Login => {
                r.read_i32().await?;
                r.read_string().await?;
                r.read_i64().await?;
                let dimension = Dimension::from_id(r.read_i8().await?);
                self.session.position.dimension = dimension;
                info!(bot = %self.shared.name(), ?dimension, "logged in");
            }
            Opcode::Chat => {
                r.read_string().await?;
            }
            Opcode::UpdateHealth => {
                self.session.health = r.read_i16().await?;
                if self.session.health <= 0 {
                    self.respawn().await?;
                }
            }
            Opcode::Respawn => {
                self.session.position.dimension = Dimension::from_id(r.read_i8().await?);
            }
            Opcode::PlayerPositionLook => self.sync_position().await?,
            Opcode::PlayerBlockPlacement => {
                r.skip(10).await?;
                self.skip_item().await?;
            }
            Opcode::NamedEntitySpawn | Opcode::Painting => {
                r.skip(4).await?;
                r.read_string().await?;
                r.skip(16).await?;
            }
            Opcode::AddObject => {
                r.skip(17).await?;
                // a positive thrower id carries a velocity
                if r.read_i32().await? > 0 {
                    r.skip(6).await?;
                }
            }
            Opcode::MobSpawn => {
                r.skip(19).await?;
                r.skip_metadata().await?;
            }
            Opcode::EntityMetadata => {
                r.skip(4).await?;
                r.skip_metadata().await?;
            }
            Opcode::MapChunk => {
                r.skip(13).await?;
                let size = r.read_i32().await?;
                r.skip_counted("chunk data", size as i64, 1).await?;
            }
            Opcode::MultiBlockChange => {
                r.skip(8).await?;
                let count = r.read_i16().await?;
                r.skip_counted("block change", count as i64, 4).await?;
            }
            Opcode::Explosion => {
                r.skip(28).await?;
                let count = r.read_i32().await?;
                r.skip_counted("explosion record", count as i64, 3).await?;
            }
            Opcode::OpenWindow => {
                r.skip(2).await?;
                r.skip_modified_utf8().await?;
                r.skip(1).await?;
            }
            Opcode::WindowClick => {
                r.skip(7).await?;
                self.skip_item().await?;
            }
            Opcode::SetSlot => {
                r.skip(3).await?;
                self.skip_item().await?;
            }
            Opcode::WindowItems => {
                r.skip(1).await?;
                let count = r.read_i16().await?;
                if count < 0 {
                    return Err(Error::InvalidLength { what: "window items", len: count as i64 });
                }
                for _ in 0..count {
                    self.skip_item().await?;
                }
            }
            Opcode::UpdateSign => {
                r.skip(10).await?;
                for _ in 0..4 {
                    r.read_string().await?;
                }
            }
            Opcode::ItemData => {
                r.skip(4).await?;
                let len = r.read_u8().await?;
                r.skip(len as usize).await?;
            }
            Opcode::ModLoaderMp => {
                // mod id, packet id
                r.skip(8).await?;
                let ints = r.read_i32().await?;
                r.skip_counted("mod ints", ints as i64, 4).await?;
                let floats = r.read_i32().await?;
                r.skip_counted("mod floats", floats as i64, 4).await?;
                let strings = r.read_i32().await?;
                if strings < 0 {
                    return Err(Error::InvalidLength { what: "mod strings", len: strings as i64 });
                }
                for _ in 0..strings {
                    let len = r.read_i32().await?;
                    r.skip_counted("mod string", len as i64, 1).await?;
                }
            }
            Opcode::Disconnect => {
                let reason = r.read_string().await?;
                return Err(Error::Disconnected { reason });
            }
            Opcode::KeepAlive
            | Opcode::TimeUpdate
            | Opcode::EntityEquipment
            | Opcode::SpawnPosition
            | Opcode::UseEntity
            | Opcode::Player
            | Opcode::PlayerPosition
            | Opcode::PlayerLook
            | Opcode::PlayerDigging
            | Opcode::HoldingChange
            | Opcode::UseBed
            | Opcode::Animation
            | Opcode::EntityAction
            | Opcode::PickupSpawn
            | Opcode::CollectItem
            | Opcode::StanceUpdate
            | Opcode::EntityVelocity
            | Opcode::DestroyEntity
            | Opcode::Entity
            | Opcode::EntityRelativeMove
            | Opcode::EntityLook
            | Opcode::EntityLookAndRelativeMove
            | Opcode::EntityTeleport
            | Opcode::EntityStatus
            | Opcode::AttachEntity
            | Opcode::PreChunk
            | Opcode::BlockChange
            | Opcode::BlockAction
            | Opcode::SoundEffect
            | Opcode::NewState
            | Opcode::Thunderbolt
            | Opcode::CloseWindow
            | Opcode::UpdateProgressBar
            | Opcode::Transaction
            | Opcode::IncrementStatistic => {
                // normally skipped by handle_packet
                if let Payload::Fixed(n) = opcode.payload() {
                    r.skip(n).await?;
                }
            }
        }
        Ok(())
    }

    /// Item id, then count and damage unless the slot is empty.
    async fn skip_item(&mut self) -> Result<()> {
        if self.reader.read_i16().await? != NO_ITEM {
            self.reader.skip(ITEM_TRAILER_LEN).await?;
        }
        Ok(())
    }

    async fn sync_position(&mut self) -> Result<()> {
        let r = &mut self.reader;
        let x = r.read_f64().await?;
        let stance = r.read_f64().await?;
        let y = r.read_f64().await?;
        let z = r.read_f64().await?;
        let yaw = r.read_f32().await?;
        let pitch = r.read_f32().await?;
        let on_ground = r.read_bool().await?;

        self.hooks.position_update(x, y, z);

        let position = &mut self.session.position;
        position.update_position(x, y, z, stance);
        position.update_look(yaw, pitch);
        position.on_ground = on_ground;
        self.send_position().await?;

        if !self.session.ready {
            self.session.ready = true;
            info!(bot = %self.shared.name(), x, y, z, "ready");

            let before = self.session.position;
            self.hooks.ready(&mut self.session.position);
            if self.session.position != before {
                self.send_position().await?;
            }
        }
        Ok(())
    }

    async fn send_position(&mut self) -> Result<()> {
        self.shared.send(&self.session.position, Flush::Now).await
    }

    async fn respawn(&mut self) -> Result<()> {
        let request = RespawnRequest { dimension: self.session.position.dimension };
        self.shared.send(&request, Flush::Deferred).await
    }
}
