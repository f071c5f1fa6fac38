//! Messages the bot sends. Each encodes to one contiguous buffer so it can be
//! written under a single acquisition of the output lock.

use bytes::Bytes;

use crate::codec::PacketWriter;
use crate::error::Result;
use crate::state::Dimension;
use super::Opcode;

/// Protocol revision announced in the login message.
pub const PROTOCOL_VERSION: i32 = 13;

/// Reason sent with a voluntary logout.
pub const LOGOUT_REASON: &str = "quitting";

pub trait OutboundMessage {
    fn opcode(&self) -> Opcode;

    fn write_payload(&self, writer: &mut PacketWriter) -> Result<()>;

    fn encode(&self) -> Result<Bytes> {
        let mut writer = PacketWriter::new();
        writer.write_u8(self.opcode() as u8);
        self.write_payload(&mut writer)?;
        Ok(writer.freeze())
    }
}

/// First message of a session: announces the player name.
#[derive(Debug, Clone)]
pub struct Handshake {
    pub name: String,
}

impl OutboundMessage for Handshake {
    fn opcode(&self) -> Opcode {
        Opcode::Handshake
    }

    fn write_payload(&self, writer: &mut PacketWriter) -> Result<()> {
        writer.write_string(&self.name)
    }
}

/// Reply to the server's handshake.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub protocol_version: i32,
    pub name: String,
}

impl LoginRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            name: name.into(),
        }
    }
}

impl OutboundMessage for LoginRequest {
    fn opcode(&self) -> Opcode {
        Opcode::Login
    }

    fn write_payload(&self, writer: &mut PacketWriter) -> Result<()> {
        writer.write_i32(self.protocol_version);
        writer.write_string(&self.name)?;
        // seed and dimension are server-to-client only
        writer.write_i64(0);
        writer.write_i8(0);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RespawnRequest {
    pub dimension: Dimension,
}

impl OutboundMessage for RespawnRequest {
    fn opcode(&self) -> Opcode {
        Opcode::Respawn
    }

    fn write_payload(&self, writer: &mut PacketWriter) -> Result<()> {
        writer.write_i8(self.dimension.id());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAlive;

impl OutboundMessage for KeepAlive {
    fn opcode(&self) -> Opcode {
        Opcode::KeepAlive
    }

    fn write_payload(&self, _writer: &mut PacketWriter) -> Result<()> {
        Ok(())
    }
}

/// Kick-style notice the client sends when it leaves on purpose.
#[derive(Debug, Clone)]
pub struct DisconnectNotice {
    pub reason: String,
}

impl OutboundMessage for DisconnectNotice {
    fn opcode(&self) -> Opcode {
        Opcode::Disconnect
    }

    fn write_payload(&self, writer: &mut PacketWriter) -> Result<()> {
        writer.write_string(&self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_bytes() {
        let bytes = Handshake { name: "Bot1".into() }.encode().unwrap();
        assert_eq!(
            &bytes[..],
            &[0x02, 0x00, 0x04, 0x00, b'B', 0x00, b'o', 0x00, b't', 0x00, b'1']
        );
    }

    #[test]
    fn test_login_bytes() {
        let bytes = LoginRequest::new("ab").encode().unwrap();
        let mut expected = vec![0x01, 0x00, 0x00, 0x00, 13];
        expected.extend_from_slice(&[0x00, 0x02, 0x00, b'a', 0x00, b'b']);
        expected.extend_from_slice(&[0; 8]);
        expected.push(0);
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn test_respawn_bytes() {
        let bytes = RespawnRequest { dimension: Dimension::Nether }.encode().unwrap();
        assert_eq!(&bytes[..], &[0x09, 0xff]);
    }

    #[test]
    fn test_keepalive_is_single_byte() {
        assert_eq!(&KeepAlive.encode().unwrap()[..], &[0x00]);
    }

    #[test]
    fn test_disconnect_notice() {
        let bytes = DisconnectNotice { reason: LOGOUT_REASON.into() }.encode().unwrap();
        assert_eq!(bytes[0], 0xff);
        assert_eq!(&bytes[1..3], &[0x00, 0x08]);
        assert_eq!(bytes.len(), 3 + 16);
    }
}
