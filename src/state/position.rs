use crate::codec::PacketWriter;
use crate::error::Result;
use crate::protocol::{Opcode, OutboundMessage};
use super::Dimension;

/// Allowed range for `stance - y`, exclusive on both ends.
pub const MIN_STANCE_OFFSET: f64 = 0.15;
pub const MAX_STANCE_OFFSET: f64 = 1.6;
/// Offset `stance` is reset to when it leaves the allowed range.
pub const DEFAULT_STANCE_OFFSET: f64 = 0.5;

/// Simulated location of the bot, echoed back to the server on every sync.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Eye height used by the movement packet.
    pub stance: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
    pub dimension: Dimension,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            stance: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: true,
            dimension: Dimension::Earth,
        }
    }
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_position(&mut self, x: f64, y: f64, z: f64, stance: f64) {
        self.x = x;
        self.y = y;
        self.z = z;
        self.stance = stance;
    }

    pub fn update_look(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn stance_offset(&self) -> f64 {
        self.stance - self.y
    }

    /// Move `distance` blocks along the current yaw. Negative walks backwards.
    pub fn walk(&mut self, distance: f64) {
        let heading = self.yaw as f64 * std::f64::consts::PI / 180.0;
        self.x -= heading.sin() * distance;
        self.z += heading.cos() * distance;
    }

    /// Move vertically, keeping the stance offset inside its allowed range.
    pub fn ascend(&mut self, delta: f64) {
        self.y += delta;
        self.stance += delta;

        let offset = self.stance_offset();
        if offset > MAX_STANCE_OFFSET || offset < MIN_STANCE_OFFSET {
            self.stance = self.y + DEFAULT_STANCE_OFFSET;
        }
    }
}

/// The full position-and-look packet. Outbound field order is x, y, stance,
/// z; the inbound order swaps y and stance.
impl OutboundMessage for Position {
    fn opcode(&self) -> Opcode {
        Opcode::PlayerPositionLook
    }

    fn write_payload(&self, writer: &mut PacketWriter) -> Result<()> {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
        writer.write_f64(self.stance);
        writer.write_f64(self.z);
        writer.write_f32(self.yaw);
        writer.write_f32(self.pitch);
        writer.write_bool(self.on_ground);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_position() {
        let pos = Position::new();
        assert!(pos.on_ground);
        assert_eq!(pos.dimension, Dimension::Earth);
    }

    #[test]
    fn test_walk_along_yaw() {
        let mut pos = Position::new();
        pos.walk(2.0);
        assert!(approx(pos.x, 0.0));
        assert!(approx(pos.z, 2.0));

        pos.yaw = 90.0;
        pos.walk(1.0);
        assert!(approx(pos.x, -1.0));
        assert!(approx(pos.z, 2.0));

        pos.walk(-1.0);
        assert!(approx(pos.x, 0.0));
    }

    #[test]
    fn test_ascend_keeps_valid_stance() {
        let mut pos = Position::new();
        pos.update_position(0.0, 64.0, 0.0, 65.5);
        pos.ascend(1.0);
        assert!(approx(pos.y, 65.0));
        assert!(approx(pos.stance, 66.5));
    }

    #[test]
    fn test_ascend_resets_stance_above_range() {
        let mut pos = Position::new();
        pos.update_position(0.0, 64.0, 0.0, 65.7);
        pos.ascend(0.5);
        assert!(approx(pos.stance, pos.y + DEFAULT_STANCE_OFFSET));
    }

    #[test]
    fn test_ascend_resets_stance_below_range() {
        let mut pos = Position::new();
        pos.update_position(0.0, 64.0, 0.0, 64.1);
        pos.ascend(-3.0);
        assert!(approx(pos.y, 61.0));
        assert!(approx(pos.stance, 61.5));

        // fresh position has stance == y
        let mut pos = Position::new();
        pos.ascend(0.0);
        assert!(approx(pos.stance_offset(), DEFAULT_STANCE_OFFSET));
    }

    #[test]
    fn test_encode_field_order() {
        let mut pos = Position::new();
        pos.update_position(1.0, 2.0, 3.0, 3.62);
        pos.update_look(90.0, -10.0);
        pos.on_ground = false;

        let bytes = pos.encode().unwrap();

        assert_eq!(bytes.len(), 1 + 8 * 4 + 4 * 2 + 1);
        assert_eq!(bytes[0], 0x0d);
        assert_eq!(&bytes[1..9], &1.0f64.to_be_bytes());
        assert_eq!(&bytes[9..17], &2.0f64.to_be_bytes());
        assert_eq!(&bytes[17..25], &3.62f64.to_be_bytes());
        assert_eq!(&bytes[25..33], &3.0f64.to_be_bytes());
        assert_eq!(&bytes[33..37], &90.0f32.to_be_bytes());
        assert_eq!(&bytes[37..41], &(-10.0f32).to_be_bytes());
        assert_eq!(bytes[41], 0);
    }
}
