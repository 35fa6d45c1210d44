//! The parent set of a DODAG. Parents are candidate next hops toward the
//! root, learned from DIOs. The set is bounded; when it is full, a new
//! parent can only push out the one with the worst Rank.

use crate::config::RPL_PARENTS_BUFFER_COUNT;
use crate::consts::{ETX_DIVISOR, INIT_LINK_METRIC};
use crate::rank::Rank;
use crate::time::{Duration, Instant};
use crate::wire::rpl::options::MetricObject;
use crate::wire::{Ipv6Address, SequenceCounter};

bitflags::bitflags! {
    pub(crate) struct ParentFlags: u8 {
        /// Set when the parent state changed since the last time routes were
        /// advertised, cleared when a DAO for it has been scheduled.
        const UPDATED = 0b0000_0001;
    }
}

/// A neighbor that advertised a Rank lower than ours in the current DODAG.
#[derive(Debug, Clone)]
pub struct Parent {
    pub(crate) address: Ipv6Address,
    pub(crate) rank: Rank,
    pub(crate) preference: u8,
    pub(crate) dtsn: SequenceCounter,
    /// Smoothed ETX of the link to this parent, scaled by [`ETX_DIVISOR`].
    pub(crate) link_metric: u16,
    /// Copy of the metric container the parent last advertised, if any.
    pub(crate) metric: Option<MetricObject>,
    pub(crate) flags: ParentFlags,
    pub(crate) last_heard: Instant,
}

impl Parent {
    pub(crate) fn new(
        address: Ipv6Address,
        rank: Rank,
        preference: u8,
        dtsn: SequenceCounter,
        now: Instant,
    ) -> Self {
        Self {
            address,
            rank,
            preference,
            dtsn,
            link_metric: INIT_LINK_METRIC * ETX_DIVISOR,
            metric: None,
            flags: ParentFlags::empty(),
            last_heard: now,
        }
    }

    pub fn address(&self) -> Ipv6Address {
        self.address
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn link_metric(&self) -> u16 {
        self.link_metric
    }

    /// Poison the parent: it advertised the infinite Rank, or a loop through
    /// it was detected. It no longer takes part in parent selection.
    pub(crate) fn poison(&mut self) {
        self.rank = Rank::new(u16::MAX, self.rank.min_hop_rank_increase);
        self.flags |= ParentFlags::UPDATED;
    }
}

/// The bounded set of candidate parents of a DODAG.
#[derive(Debug, Default)]
pub struct ParentSet {
    parents: heapless::Vec<Parent, RPL_PARENTS_BUFFER_COUNT>,
}

impl ParentSet {
    /// Add a parent to the set, or update the one with the same address.
    /// When the set is full, the worst parent is evicted if the new one has
    /// a better Rank; otherwise the new parent is not admitted.
    pub(crate) fn add(&mut self, parent: Parent) {
        if let Some(p) = self.find_mut(&parent.address) {
            *p = parent;
        } else if let Err(parent) = self.parents.push(parent) {
            match self.worst_parent() {
                Some(worst) if worst.rank.dag_rank() > parent.rank.dag_rank() => {
                    *worst = parent;
                }
                _ => net_debug!("parent set full, not adding {}", parent.address),
            }
        }
    }

    /// Find a parent based on its address.
    pub(crate) fn find(&self, address: &Ipv6Address) -> Option<&Parent> {
        self.parents.iter().find(|p| p.address == *address)
    }

    /// Find a mutable parent based on its address.
    pub(crate) fn find_mut(&mut self, address: &Ipv6Address) -> Option<&mut Parent> {
        self.parents.iter_mut().find(|p| p.address == *address)
    }

    /// Remove the parent with the given address.
    pub(crate) fn remove(&mut self, address: &Ipv6Address) {
        self.parents.retain(|p| p.address != *address);
    }

    /// Return a slice to the parent set.
    pub(crate) fn parents(&self) -> &[Parent] {
        &self.parents
    }

    pub(crate) fn clear(&mut self) {
        self.parents.clear();
    }

    /// Remove parents that have not been heard from for `expiration`.
    ///
    /// Returns `true` when a parent was actually removed.
    pub(crate) fn purge(&mut self, now: Instant, expiration: Duration) -> bool {
        let len = self.parents.len();
        self.parents.retain(|p| p.last_heard + expiration >= now);
        self.parents.len() != len
    }

    /// Find the worst parent that is currently in the parent set.
    fn worst_parent(&mut self) -> Option<&mut Parent> {
        self.parents
            .iter_mut()
            .max_by_key(|p| p.rank.dag_rank())
    }
}
