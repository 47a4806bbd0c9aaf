//! # Address-Resolution Message (Ethernet/IPv4 variant)
//!
//! Fixed 28-byte layout: hardware type, protocol type, hardware/protocol
//! address lengths, operation, then sender and target hardware/protocol
//! addresses.

use std::net::Ipv4Addr;

pub const MESSAGE_LEN: usize = 28;
pub const HW_TYPE_ETHERNET: u16 = 1;
pub const PROTO_TYPE_IPV4: u16 = 0x0800;
pub const HW_LEN: u8 = 6;
pub const PROTO_LEN: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Request,
    Reply,
    Unknown(u16),
}

impl Operation {
    fn from_u16(raw: u16) -> Self {
        match raw {
            1 => Operation::Request,
            2 => Operation::Reply,
            other => Operation::Unknown(other),
        }
    }

    fn to_u16(self) -> u16 {
        match self {
            Operation::Request => 1,
            Operation::Reply => 2,
            Operation::Unknown(raw) => raw,
        }
    }
}

pub struct Message<'a> {
    buf: &'a [u8],
}

impl<'a> Message<'a> {
    pub fn new_checked(buf: &'a [u8]) -> Option<Self> {
        if buf.len() < MESSAGE_LEN {
            return None;
        }
        Some(Message { buf })
    }

    pub fn hw_type(&self) -> u16 {
        u16::from_be_bytes([self.buf[0], self.buf[1]])
    }

    pub fn proto_type(&self) -> u16 {
        u16::from_be_bytes([self.buf[2], self.buf[3]])
    }

    pub fn hw_len(&self) -> u8 {
        self.buf[4]
    }

    pub fn proto_len(&self) -> u8 {
        self.buf[5]
    }

    pub fn operation(&self) -> Operation {
        Operation::from_u16(u16::from_be_bytes([self.buf[6], self.buf[7]]))
    }

    pub fn sender_hw(&self) -> [u8; 6] {
        self.buf[8..14].try_into().unwrap()
    }

    pub fn sender_proto(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.buf[14], self.buf[15], self.buf[16], self.buf[17])
    }

    pub fn target_hw(&self) -> [u8; 6] {
        self.buf[18..24].try_into().unwrap()
    }

    pub fn target_proto(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.buf[24], self.buf[25], self.buf[26], self.buf[27])
    }
}

/// Writes a complete ARP message into the first [`MESSAGE_LEN`] bytes of
/// `buf`. Hardware/protocol type and length fields are always Ethernet/IPv4
/// (6, 4) — callers never supply them, closing off the field-width mistake
/// flagged against the reference implementation this crate's cache sweep is
/// modeled on.
#[allow(clippy::too_many_arguments)]
pub fn build(
    buf: &mut [u8],
    operation: Operation,
    sender_hw: [u8; 6],
    sender_proto: Ipv4Addr,
    target_hw: [u8; 6],
    target_proto: Ipv4Addr,
) {
    buf[0..2].copy_from_slice(&HW_TYPE_ETHERNET.to_be_bytes());
    buf[2..4].copy_from_slice(&PROTO_TYPE_IPV4.to_be_bytes());
    buf[4] = HW_LEN;
    buf[5] = PROTO_LEN;
    buf[6..8].copy_from_slice(&operation.to_u16().to_be_bytes());
    buf[8..14].copy_from_slice(&sender_hw);
    buf[14..18].copy_from_slice(&sender_proto.octets());
    buf[18..24].copy_from_slice(&target_hw);
    buf[24..28].copy_from_slice(&target_proto.octets());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_correct_field_widths() {
        let mut buf = [0u8; MESSAGE_LEN];
        build(
            &mut buf,
            Operation::Request,
            [1; 6],
            Ipv4Addr::new(10, 0, 0, 1),
            [0; 6],
            Ipv4Addr::new(10, 0, 0, 2),
        );
        let msg = Message::new_checked(&buf).unwrap();
        assert_eq!(msg.hw_len(), 6);
        assert_eq!(msg.proto_len(), 4);
        assert_eq!(msg.operation(), Operation::Request);
        assert_eq!(msg.sender_proto(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(msg.target_proto(), Ipv4Addr::new(10, 0, 0, 2));
    }
}
