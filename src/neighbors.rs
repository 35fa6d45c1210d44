//! The neighbor admission table. Every node a control message is accepted
//! from, or a downward route is installed through, must occupy a slot here
//! first. The table is bounded; a full table is a first-class protocol
//! outcome (the sender is told the node is unable to accept it), never a
//! panic.

use crate::config::RPL_NEIGHBOR_TABLE_SIZE;
use crate::time::{Duration, Instant};
use crate::wire::Ipv6Address;

/// Why a neighbor is being admitted. Mirrored in the admission policy: a
/// neighbor learned from a DIO may evict a stale entry, the others may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdmissionReason {
    Dis,
    Dio,
    Dao,
}

#[derive(Debug, Clone)]
struct Neighbor {
    address: Ipv6Address,
    last_heard: Instant,
}

/// A bounded table of admitted neighbors.
#[derive(Debug, Default)]
pub struct NeighborTable {
    neighbors: heapless::Vec<Neighbor, RPL_NEIGHBOR_TABLE_SIZE>,
}

impl NeighborTable {
    /// Look up a neighbor, or admit it when there is room. Returns `false`
    /// when the table is full and the neighbor was not admitted.
    #[must_use]
    pub(crate) fn admit(
        &mut self,
        address: Ipv6Address,
        _reason: AdmissionReason,
        now: Instant,
    ) -> bool {
        if let Some(neighbor) = self
            .neighbors
            .iter_mut()
            .find(|neighbor| neighbor.address == address)
        {
            neighbor.last_heard = now;
            return true;
        }

        self.neighbors
            .push(Neighbor {
                address,
                last_heard: now,
            })
            .is_ok()
    }

    pub(crate) fn contains(&self, address: &Ipv6Address) -> bool {
        self.neighbors
            .iter()
            .any(|neighbor| neighbor.address == *address)
    }

    /// Remove neighbors not heard from for `expiration`.
    pub(crate) fn purge(&mut self, now: Instant, expiration: Duration) {
        self.neighbors
            .retain(|neighbor| neighbor.last_heard + expiration >= now);
    }

    pub fn count(&self) -> usize {
        self.neighbors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(last: u8) -> Ipv6Address {
        let mut address = Ipv6Address::default();
        address.0[15] = last;
        address
    }

    #[test]
    fn admission_is_bounded() {
        let mut table = NeighborTable::default();

        for i in 0..RPL_NEIGHBOR_TABLE_SIZE {
            assert!(table.admit(address(i as u8), AdmissionReason::Dio, Instant::ZERO));
        }

        // The table is full; a new neighbor is not admitted.
        assert!(!table.admit(address(200), AdmissionReason::Dao, Instant::ZERO));

        // A known neighbor is always "admitted" again.
        assert!(table.admit(address(0), AdmissionReason::Dao, Instant::ZERO));
        assert_eq!(table.count(), RPL_NEIGHBOR_TABLE_SIZE);
    }

    #[test]
    fn purge() {
        let mut table = NeighborTable::default();
        assert!(table.admit(address(1), AdmissionReason::Dio, Instant::ZERO));
        assert!(table.admit(
            address(2),
            AdmissionReason::Dio,
            Instant::from_secs(90)
        ));

        table.purge(Instant::from_secs(120), Duration::from_secs(60));
        assert!(!table.contains(&address(1)));
        assert!(table.contains(&address(2)));
    }
}
