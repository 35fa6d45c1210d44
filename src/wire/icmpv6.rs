//! A minimal view of the ICMPv6 header, just deep enough to carry RPL
//! control messages (type 155). The surrounding IPv6 transport is the host
//! stack's job.

use byteorder::{ByteOrder, NetworkEndian};

use super::ipv6::Address;
use super::{checksum, Error, Result};

enum_with_unknown! {
    /// Internet protocol control message type.
    pub enum Message(u8) {
        /// RPL control message, see [RFC 6550 § 6].
        ///
        /// [RFC 6550 § 6]: https://datatracker.ietf.org/doc/html/rfc6550#section-6
        RplControl = 0x9b,
    }
}

impl core::fmt::Display for Message {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Message::RplControl => write!(f, "RPL control message"),
            Message::Unknown(id) => write!(f, "{id}"),
        }
    }
}

/// A read/write wrapper around an Internet Control Message Protocol version 6 packet buffer.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<T: AsRef<[u8]>> {
    pub(super) buffer: T,
}

// Ranges and constants describing key boundaries in the ICMPv6 header.
pub(super) mod field {
    use crate::wire::field::*;

    // ICMPv6: See https://tools.ietf.org/html/rfc4443
    pub const TYPE: usize = 0;
    pub const CODE: usize = 1;
    pub const CHECKSUM: Field = 2..4;
}

impl<T: AsRef<[u8]>> Packet<T> {
    /// Imbue a raw octet buffer with ICMPv6 packet structure.
    pub const fn new_unchecked(buffer: T) -> Packet<T> {
        Packet { buffer }
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(buffer: T) -> Result<Packet<T>> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error)` if the buffer is too short.
    pub fn check_len(&self) -> Result<()> {
        let len = self.buffer.as_ref().len();

        if len < field::CHECKSUM.end {
            return Err(Error);
        }

        match self.msg_type() {
            Message::RplControl => super::rpl::check_len(self),
            Message::Unknown(_) => Err(Error),
        }
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the message type field.
    #[inline]
    pub fn msg_type(&self) -> Message {
        get!(self.buffer, into: Message, field: field::TYPE)
    }

    /// Return the message code field.
    #[inline]
    pub fn msg_code(&self) -> u8 {
        get!(self.buffer, field: field::CODE)
    }

    /// Return the checksum field.
    #[inline]
    pub fn checksum(&self) -> u16 {
        get!(self.buffer, u16, field: field::CHECKSUM)
    }

    /// Validate the header checksum.
    pub fn verify_checksum(&self, src_addr: &Address, dst_addr: &Address) -> bool {
        let data = self.buffer.as_ref();
        checksum::combine(&[
            checksum::pseudo_header_v6(src_addr, dst_addr, data.len() as u32),
            checksum::data(data),
        ]) == !0
    }
}

impl<'a, T: AsRef<[u8]> + ?Sized> Packet<&'a T> {
    /// Return a pointer to the type-specific data.
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        let data = self.buffer.as_ref();
        &data[field::CHECKSUM.end..]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the message type field.
    #[inline]
    pub fn set_msg_type(&mut self, value: Message) {
        set!(self.buffer, value.into(), field: field::TYPE)
    }

    /// Set the message code field.
    #[inline]
    pub fn set_msg_code(&mut self, value: u8) {
        set!(self.buffer, value, field: field::CODE)
    }

    /// Set the checksum field.
    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        set!(self.buffer, value, u16, field: field::CHECKSUM)
    }

    /// Compute and fill in the header checksum.
    pub fn fill_checksum(&mut self, src_addr: &Address, dst_addr: &Address) {
        self.set_checksum(0);
        let checksum = {
            let data = self.buffer.as_ref();
            !checksum::combine(&[
                checksum::pseudo_header_v6(src_addr, dst_addr, data.len() as u32),
                checksum::data(data),
            ])
        };
        self.set_checksum(checksum);
    }
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Packet<T> {
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_buffer() {
        assert_eq!(Packet::new_checked(&[0x9bu8; 2][..]).err(), Some(Error));
    }

    #[test]
    fn checksum_round_trip() {
        let src = Address::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        let dst = Address::LINK_LOCAL_ALL_RPL_NODES;

        // A DIS message.
        let mut buffer = [0x9b, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut packet = Packet::new_unchecked(&mut buffer[..]);
        packet.fill_checksum(&src, &dst);

        let packet = Packet::new_unchecked(&buffer[..]);
        assert!(packet.verify_checksum(&src, &dst));
    }
}
