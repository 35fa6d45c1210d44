/// A RPL instance id, either global or local to a DODAG, see [RFC 6550 §
/// 5.1].
///
/// [RFC 6550 § 5.1]: https://datatracker.ietf.org/doc/html/rfc6550#section-5.1
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InstanceId {
    Global(u8),
    Local(u8),
}

impl From<u8> for InstanceId {
    fn from(val: u8) -> Self {
        const MASK: u8 = 0b0111_1111;

        if (val >> 7) == 0b0 {
            Self::Global(val & MASK)
        } else {
            Self::Local(val & MASK)
        }
    }
}

impl From<InstanceId> for u8 {
    fn from(val: InstanceId) -> Self {
        match val {
            InstanceId::Global(val) => val,
            InstanceId::Local(val) => 0b1000_0000 | val,
        }
    }
}

impl InstanceId {
    /// Return the real part of the ID.
    pub fn id(&self) -> u8 {
        match self {
            Self::Global(val) => *val,
            Self::Local(val) => *val,
        }
    }

    /// Returns `true` when the DODAG ID is the destination address of the
    /// IPv6 packet.
    #[inline]
    pub fn dodag_is_destination(&self) -> bool {
        match self {
            Self::Global(_) => false,
            Self::Local(val) => ((val >> 6) & 0b1) == 0b1,
        }
    }

    /// Returns `true` when the DODAG ID is the source address of the IPv6
    /// packet.
    ///
    /// *NOTE*: this only makes sense when using a local RPL Instance ID and
    /// the packet is not a RPL control message.
    #[inline]
    pub fn dodag_is_source(&self) -> bool {
        !self.dodag_is_destination()
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(self, InstanceId::Local(_))
    }

    #[inline]
    pub fn is_global(&self) -> bool {
        matches!(self, InstanceId::Global(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8() {
        assert_eq!(InstanceId::from(0x1e), InstanceId::Global(30));
        assert_eq!(InstanceId::from(0x9e), InstanceId::Local(30));
        assert_eq!(u8::from(InstanceId::Global(30)), 0x1e);
        assert_eq!(u8::from(InstanceId::Local(30)), 0x9e);
    }

    #[test]
    fn dodag_predicates() {
        assert!(InstanceId::from(0xde).dodag_is_destination());
        assert!(!InstanceId::from(0x9e).dodag_is_destination());
        assert!(InstanceId::from(0x9e).dodag_is_source());
        assert!(!InstanceId::from(0x1e).dodag_is_destination());
    }
}
