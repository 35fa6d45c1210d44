//! The storing-mode downward route table. Each entry carries, next to the
//! forwarding state (prefix and next hop), the DAO bookkeeping that drives
//! acknowledgements, No-Path expiry and cleanup: the sequence numbers seen
//! from below and used toward the parent, the path sequence of the last
//! advertisement, and the pending/no-path flags.
//!
//! The host mirrors this table into its forwarding plane.

use crate::config::RPL_ROUTES_BUFFER_COUNT;
use crate::time::Instant;
use crate::wire::Ipv6Address;

bitflags::bitflags! {
    pub(crate) struct RouteFlags: u8 {
        /// A forwarded DAO for this route awaits an acknowledgement from
        /// upstream.
        const DAO_PENDING = 0b0000_0001;
        /// A No-Path DAO was accepted; the route lingers shortly so
        /// in-flight datagrams still find a next hop.
        const NOPATH_RECEIVED = 0b0000_0010;
    }
}

/// A downward route, learned from a DAO.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) prefix: Ipv6Address,
    pub(crate) prefix_len: u8,
    pub(crate) next_hop: Ipv6Address,
    /// Remaining lifetime, in seconds.
    pub(crate) lifetime: u32,
    pub(crate) dao_seqno_in: u8,
    pub(crate) dao_seqno_out: u8,
    pub(crate) dao_path_sequence: u8,
    pub(crate) flags: RouteFlags,
}

impl Route {
    pub fn prefix(&self) -> (Ipv6Address, u8) {
        (self.prefix, self.prefix_len)
    }

    pub fn next_hop(&self) -> Ipv6Address {
        self.next_hop
    }

    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    pub(crate) fn is_dao_pending(&self) -> bool {
        self.flags.contains(RouteFlags::DAO_PENDING)
    }

    pub(crate) fn is_nopath_received(&self) -> bool {
        self.flags.contains(RouteFlags::NOPATH_RECEIVED)
    }
}

impl core::fmt::Display for Route {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}/{} via {} ({}s)",
            self.prefix, self.prefix_len, self.next_hop, self.lifetime
        )
    }
}

/// The bounded table of downward routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: heapless::Vec<Route, RPL_ROUTES_BUFFER_COUNT>,
    /// Wall clock of the last lifetime tick.
    last_tick: Option<Instant>,
}

impl RouteTable {
    /// Install a route, or refresh the entry with the same prefix. Returns
    /// `None` when the table is full; the caller reports the admission
    /// failure to the sender.
    pub(crate) fn add(
        &mut self,
        prefix: Ipv6Address,
        prefix_len: u8,
        next_hop: Ipv6Address,
        lifetime: u32,
    ) -> Option<&mut Route> {
        if let Some(i) = self
            .routes
            .iter()
            .position(|r| r.prefix == prefix && r.prefix_len == prefix_len)
        {
            let route = &mut self.routes[i];
            route.next_hop = next_hop;
            route.lifetime = lifetime;
            return Some(route);
        }

        self.routes
            .push(Route {
                prefix,
                prefix_len,
                next_hop,
                lifetime,
                dao_seqno_in: 0,
                dao_seqno_out: 0,
                dao_path_sequence: 0,
                flags: RouteFlags::empty(),
            })
            .ok()?;

        self.routes.last_mut()
    }

    /// Look up the route for an exact prefix.
    pub(crate) fn lookup(&self, prefix: &Ipv6Address, prefix_len: u8) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.prefix == *prefix && r.prefix_len == prefix_len)
    }

    pub(crate) fn lookup_mut(
        &mut self,
        prefix: &Ipv6Address,
        prefix_len: u8,
    ) -> Option<&mut Route> {
        self.routes
            .iter_mut()
            .find(|r| r.prefix == *prefix && r.prefix_len == prefix_len)
    }

    /// Find the pending outbound DAO forward matching an acknowledged
    /// sequence number.
    pub(crate) fn find_by_dao_seqno_out(&mut self, seqno: u8) -> Option<&mut Route> {
        self.routes
            .iter_mut()
            .find(|r| r.dao_seqno_out == seqno && r.is_dao_pending())
    }

    /// Remove the route for an exact prefix.
    pub(crate) fn remove(&mut self, prefix: &Ipv6Address, prefix_len: u8) {
        self.routes
            .retain(|r| !(r.prefix == *prefix && r.prefix_len == prefix_len));
    }

    pub(crate) fn clear(&mut self) {
        self.routes.clear();
    }

    /// Age route lifetimes by the seconds elapsed since the previous tick
    /// and drop expired entries.
    ///
    /// Returns `true` when a route was actually removed.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        let elapsed = match self.last_tick {
            Some(last) => (now - last).secs() as u32,
            None => 0,
        };

        if elapsed == 0 {
            if self.last_tick.is_none() {
                self.last_tick = Some(now);
            }
            return false;
        }

        self.last_tick = Some(now);

        let len = self.routes.len();
        self.routes.retain_mut(|r| {
            if r.lifetime <= elapsed {
                net_trace!("route {} expired", r);
                false
            } else {
                r.lifetime -= elapsed;
                true
            }
        });
        self.routes.len() != len
    }

    /// Iterate over the routes, e.g. to mirror them into the forwarding
    /// plane.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
