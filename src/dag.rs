//! The DODAG a node participates in: identity, advertised configuration,
//! the bounded parent set and the elected preferred parent. The preferred
//! parent is stored as an address key into the parent set, never as a
//! reference, so parent eviction cannot leave it dangling.

use crate::parents::{Parent, ParentSet};
use crate::rank::Rank;
use crate::trickle::TrickleTimer;
use crate::wire::{Ipv6Address, SequenceCounter};

/// The prefix a DODAG distributes through the Prefix Information option of
/// its DIOs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrefixInfo {
    pub prefix: Ipv6Address,
    pub length: u8,
    pub on_link: bool,
    pub autonomous_address_configuration: bool,
    pub lifetime: u32,
}

/// A Destination-Oriented Directed Acyclic Graph this node is a member of,
/// or is considering joining.
#[derive(Debug)]
pub struct Dodag {
    pub(crate) id: Ipv6Address,
    pub(crate) version_number: SequenceCounter,
    pub(crate) rank: Rank,
    pub(crate) grounded: bool,
    pub(crate) preference: u8,
    pub(crate) joined: bool,
    pub(crate) prefix_info: Option<PrefixInfo>,
    pub(crate) parents: ParentSet,
    pub(crate) preferred_parent: Option<Ipv6Address>,
    pub(crate) dio_timer: TrickleTimer,
}

impl Dodag {
    pub fn id(&self) -> Ipv6Address {
        self.id
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn version_number(&self) -> SequenceCounter {
        self.version_number
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// The elected preferred parent, when there is one.
    ///
    /// The returned parent is always a member of the parent set.
    pub fn preferred_parent(&self) -> Option<&Parent> {
        self.preferred_parent
            .as_ref()
            .and_then(|addr| self.parents.find(addr))
    }

    /// Install a new preferred parent. An address without a parent set
    /// entry clears the election instead, keeping the invariant that the
    /// preferred parent is a member of the set.
    pub(crate) fn set_preferred_parent(&mut self, address: Option<Ipv6Address>) {
        self.preferred_parent = match address {
            Some(address) if self.parents.find(&address).is_some() => Some(address),
            _ => None,
        };
    }

    /// Clear the preferred parent and advertise the infinite Rank from now
    /// on.
    pub(crate) fn detach(&mut self) {
        self.preferred_parent = None;
        self.rank = Rank::new(u16::MAX, self.rank.min_hop_rank_increase);
    }
}
