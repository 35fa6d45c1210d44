//! The source-route graph kept by a non-storing root. Each relation links a
//! target to the parent it advertised in the transit information of its
//! DAO; the root later folds chains of relations into source routing
//! headers. Only the graph maintenance lives here.

use crate::config::RPL_RELATIONS_BUFFER_COUNT;
use crate::time::{Duration, Instant};
use crate::wire::Ipv6Address;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Relation {
    target: Ipv6Address,
    parent: Ipv6Address,
    expires_at: Instant,
}

impl Relation {
    pub fn target(&self) -> Ipv6Address {
        self.target
    }

    pub fn parent(&self) -> Ipv6Address {
        self.parent
    }
}

impl core::fmt::Display for Relation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} via {} (expires at {})",
            self.target, self.parent, self.expires_at
        )
    }
}

/// The bounded relation graph of a non-storing root.
#[derive(Debug, Default)]
pub struct Relations {
    relations: heapless::Vec<Relation, RPL_RELATIONS_BUFFER_COUNT>,
}

impl Relations {
    /// Add a relation for a target, or refresh the existing one. Returns
    /// `false` when the graph is full and the relation was not recorded.
    #[must_use]
    pub(crate) fn update(
        &mut self,
        target: Ipv6Address,
        parent: Ipv6Address,
        now: Instant,
        lifetime: Duration,
    ) -> bool {
        if let Some(relation) = self.relations.iter_mut().find(|r| r.target == target) {
            relation.parent = parent;
            relation.expires_at = now + lifetime;
            return true;
        }

        self.relations
            .push(Relation {
                target,
                parent,
                expires_at: now + lifetime,
            })
            .is_ok()
    }

    /// Expire the relation of `target` through `parent`, following a
    /// No-Path DAO. A relation through a different parent is left alone: it
    /// was refreshed in the meantime.
    pub(crate) fn expire(&mut self, target: &Ipv6Address, parent: &Ipv6Address) {
        self.relations
            .retain(|r| !(r.target == *target && r.parent == *parent));
    }

    /// Return the parent of a target, when the graph holds one.
    pub fn find_parent(&self, target: &Ipv6Address) -> Option<Ipv6Address> {
        self.relations
            .iter()
            .find(|r| r.target == *target)
            .map(|r| r.parent)
    }

    /// Iterate over the targets a parent advertised.
    pub fn find_targets<'r>(
        &'r self,
        parent: &'r Ipv6Address,
    ) -> impl Iterator<Item = Ipv6Address> + 'r {
        self.relations
            .iter()
            .filter(move |r| r.parent == *parent)
            .map(|r| r.target)
    }

    /// Purge expired relations.
    ///
    /// Returns `true` when a relation was actually removed.
    pub(crate) fn purge(&mut self, now: Instant) -> bool {
        let len = self.relations.len();
        self.relations.retain(|r| {
            if r.expires_at <= now {
                net_trace!("removing relation {}", r);
                false
            } else {
                true
            }
        });
        self.relations.len() != len
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }
}
