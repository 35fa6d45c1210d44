//! Low-level packet access and construction.
//!
//! The `wire` module deals with the packet *representation*. It provides two
//! levels of functionality.
//!
//!  * First, it provides functions to extract fields from sequences of octets,
//!    and to insert fields into sequences of octets. This happens through the
//!    `Packet` family of structures, e.g. [RplPacket](struct.RplPacket.html).
//!
//!  * Second, in cases where the space of valid field values is much smaller
//!    than the space of possible field values, it provides a compact,
//!    high-level representation of packet data that can be parsed from and
//!    emitted into a sequence of octets. This happens through the `Repr`
//!    family of enums, e.g. [RplRepr](enum.RplRepr.html).
//!
//! The data structures in the `wire` module do not perform validation of
//! received data beyond what is necessary to build the representation; that
//! is the job of the message handlers.

mod field {
    pub type Field = ::core::ops::Range<usize>;
    pub type Rest = ::core::ops::RangeFrom<usize>;
}

macro_rules! get {
    ($buffer:expr, field: $field:expr $(,)?) => {
        get!($buffer, u8, field: $field)
    };
    ($buffer:expr, field: $field:expr, mask: $mask:expr $(,)?) => {
        get!($buffer, u8, field: $field, mask: $mask)
    };
    ($buffer:expr, field: $field:expr, shift: $shift:expr, mask: $mask:expr $(,)?) => {
        get!($buffer, u8, field: $field, shift: $shift, mask: $mask)
    };
    ($buffer:expr, u8, field: $field:expr $(,)?) => {
        $buffer.as_ref()[$field]
    };
    ($buffer:expr, u8, field: $field:expr, mask: $mask:expr $(,)?) => {
        $buffer.as_ref()[$field] & $mask
    };
    ($buffer:expr, u8, field: $field:expr, shift: $shift:expr, mask: $mask:expr $(,)?) => {
        ($buffer.as_ref()[$field] >> $shift) & $mask
    };
    ($buffer:expr, bool, field: $field:expr, shift: $shift:expr, mask: $mask:expr $(,)?) => {
        (($buffer.as_ref()[$field] >> $shift) & $mask) == 0b1
    };
    ($buffer:expr, u16, field: $field:expr $(,)?) => {
        NetworkEndian::read_u16(&$buffer.as_ref()[$field])
    };
    ($buffer:expr, u32, field: $field:expr $(,)?) => {
        NetworkEndian::read_u32(&$buffer.as_ref()[$field])
    };
    ($buffer:expr, into: $into:ty, field: $field:expr $(,)?) => {
        <$into>::from($buffer.as_ref()[$field])
    };
    ($buffer:expr, into: $into:ty, fun: $fun:ident, field: $field:expr $(,)?) => {
        <$into>::$fun(&$buffer.as_ref()[$field])
    };
}

macro_rules! set {
    ($buffer:expr, $value:expr, field: $field:expr $(,)?) => {
        set!($buffer, $value, u8, field: $field)
    };
    ($buffer:expr, $value:expr, field: $field:expr, mask: $mask:expr $(,)?) => {
        set!($buffer, $value, u8, field: $field, mask: $mask)
    };
    ($buffer:expr, $value:expr, field: $field:expr, shift: $shift:expr, mask: $mask:expr $(,)?) => {
        set!($buffer, $value, u8, field: $field, shift: $shift, mask: $mask)
    };
    ($buffer:expr, $value:expr, u8, field: $field:expr $(,)?) => {
        $buffer.as_mut()[$field] = $value
    };
    ($buffer:expr, $value:expr, u8, field: $field:expr, mask: $mask:expr $(,)?) => {
        $buffer.as_mut()[$field] = ($buffer.as_ref()[$field] & !$mask) | ($value & $mask)
    };
    ($buffer:expr, $value:expr, u8, field: $field:expr, shift: $shift:expr, mask: $mask:expr $(,)?) => {
        $buffer.as_mut()[$field] = ($buffer.as_ref()[$field] & !($mask << $shift))
            | (($value & $mask) << $shift)
    };
    ($buffer:expr, $value:expr, bool, field: $field:expr, shift: $shift:expr, mask: $mask:expr $(,)?) => {
        set!($buffer, if $value { 0b1 } else { 0b0 }, u8,
             field: $field, shift: $shift, mask: $mask)
    };
    ($buffer:expr, $value:expr, u16, field: $field:expr $(,)?) => {
        NetworkEndian::write_u16(&mut $buffer.as_mut()[$field], $value)
    };
    ($buffer:expr, $value:expr, u32, field: $field:expr $(,)?) => {
        NetworkEndian::write_u32(&mut $buffer.as_mut()[$field], $value)
    };
    ($buffer:expr, address: $address:expr, field: $field:expr $(,)?) => {
        $buffer.as_mut()[$field].copy_from_slice($address.as_bytes())
    };
}

pub mod icmpv6;
pub mod ipv6;
pub mod rpl;

pub use self::icmpv6::{Message as Icmpv6Message, Packet as Icmpv6Packet};
pub use self::ipv6::Address as Ipv6Address;
pub use self::rpl::{
    options::Repr as RplOptionRepr, InstanceId as RplInstanceId, ModeOfOperation,
    Packet as RplPacket, Repr as RplRepr, SequenceCounter,
};

/// Parsing a packet failed.
///
/// Either it is malformed, or it is not supported by this implementation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Error;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "wire::Error")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

/// Internet checksum calculation, over the IPv6 pseudo-header.
pub mod checksum {
    use byteorder::{ByteOrder, NetworkEndian};

    use super::ipv6::Address;

    const ICMPV6_NEXT_HEADER: u8 = 0x3a;

    fn propagate_carries(word: u32) -> u16 {
        let sum = (word >> 16) + (word & 0xffff);
        ((sum >> 16) as u16) + (sum as u16)
    }

    /// Compute an RFC 1071 compliant checksum (without the final complement).
    pub fn data(mut data: &[u8]) -> u16 {
        let mut accum = 0;

        while data.len() >= 2 {
            accum += NetworkEndian::read_u16(data) as u32;
            data = &data[2..];
        }

        if let Some(&value) = data.first() {
            accum += (value as u32) << 8;
        }

        propagate_carries(accum)
    }

    /// Combine several RFC 1071 compliant checksums.
    pub fn combine(checksums: &[u16]) -> u16 {
        let mut accum: u32 = 0;
        for &word in checksums {
            accum += word as u32;
        }
        propagate_carries(accum)
    }

    /// Compute an IPv6 pseudo header checksum.
    pub fn pseudo_header_v6(src_addr: &Address, dst_addr: &Address, length: u32) -> u16 {
        let mut proto_len = [0u8; 8];
        proto_len[7] = ICMPV6_NEXT_HEADER;
        NetworkEndian::write_u32(&mut proto_len[0..4], length);

        combine(&[
            data(src_addr.as_bytes()),
            data(dst_addr.as_bytes()),
            data(&proto_len[..]),
        ])
    }
}
