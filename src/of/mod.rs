//! The Objective Functions. An OF turns the metrics a node knows about its
//! neighbors into a Rank, elects the preferred parent among the candidates,
//! and arbitrates between DODAGs. Which OF governs a DODAG is advertised by
//! the root as an Objective Code Point in the DODAG Configuration option.
//!
//! Two objective functions are implemented: OF0 ([RFC 6552]) and MRHOF
//! ([RFC 6719]). They are dispatched through an enum, so no indirect calls
//! are involved.
//!
//! [RFC 6552]: https://datatracker.ietf.org/doc/html/rfc6552
//! [RFC 6719]: https://datatracker.ietf.org/doc/html/rfc6719

mod mrhof;
mod of0;

pub use mrhof::Mrhof;
pub use of0::{ObjectiveFunction0, StepOfRank};

use crate::consts::{DAO_ACK_UNABLE_TO_ACCEPT, DAO_ACK_UNABLE_TO_ADD_ROUTE_AT_ROOT};
use crate::dag::Dodag;
use crate::parents::{Parent, ParentSet};
use crate::wire::rpl::options::MetricObject;
use crate::wire::Ipv6Address;

/// Outcome of a link-layer transmission, reported by the host's link
/// statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmissionStatus {
    /// The frame was acknowledged after `numtx` attempts.
    Ok,
    /// The frame was never acknowledged.
    NoAck,
    /// The channel was busy.
    Collision,
    /// The radio failed to transmit.
    Err,
}

/// The metric container type a DODAG aggregates, from [RFC 6551].
///
/// [RFC 6551]: https://datatracker.ietf.org/doc/html/rfc6551
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MetricContainerType {
    #[default]
    None,
    Etx,
    Energy,
}

/// An objective function, selected by the Objective Code Point of the
/// DODAG configuration.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ObjectiveFunction {
    Of0(ObjectiveFunction0),
    Mrhof(Mrhof),
}

impl Default for ObjectiveFunction {
    fn default() -> Self {
        Self::Of0(ObjectiveFunction0::default())
    }
}

impl ObjectiveFunction {
    /// Instantiate the objective function identified by an Objective Code
    /// Point. Returns `None` for an OCP this node does not implement.
    pub fn from_ocp(ocp: u16) -> Option<Self> {
        match ocp {
            ObjectiveFunction0::OCP => Some(Self::Of0(ObjectiveFunction0::default())),
            Mrhof::OCP => Some(Self::Mrhof(Mrhof)),
            _ => None,
        }
    }

    /// The Objective Code Point of this objective function.
    pub fn ocp(&self) -> u16 {
        match self {
            Self::Of0(_) => ObjectiveFunction0::OCP,
            Self::Mrhof(_) => Mrhof::OCP,
        }
    }

    /// Forget any state when detaching from a DODAG.
    pub(crate) fn reset(&mut self) {
        net_debug!("resetting objective function (OCP {})", self.ocp());
    }

    /// Feed a transmission outcome into the link metric of a parent.
    ///
    /// Only successful and unacknowledged transmissions move the estimate;
    /// collisions and radio errors say nothing about the link quality.
    pub(crate) fn neighbor_link_callback(
        &self,
        parent: &mut Parent,
        status: TransmissionStatus,
        numtx: u8,
    ) {
        match self {
            // OF0 has no callback of its own: the update below stands in
            // for the host's link statistics module, which OF0 reads its
            // ETX from.
            Self::Of0(_) => mrhof::update_link_metric(parent, status, numtx),
            Self::Mrhof(_) => mrhof::update_link_metric(parent, status, numtx),
        }
    }

    /// Select the better of two candidate parents, taking hysteresis around
    /// the current preferred parent into account.
    pub(crate) fn best_parent<'p>(
        &self,
        preferred: Option<&Ipv6Address>,
        p1: &'p Parent,
        p2: &'p Parent,
        min_hop_rank_increase: u16,
    ) -> &'p Parent {
        match self {
            Self::Of0(of) => of.best_parent(preferred, p1, p2, min_hop_rank_increase),
            Self::Mrhof(of) => of.best_parent(preferred, p1, p2),
        }
    }

    /// Elect the preferred parent from the parent set. Parents the
    /// objective function considers unusable never win.
    pub(crate) fn preferred_parent(
        &self,
        parents: &ParentSet,
        preferred: Option<&Ipv6Address>,
        min_hop_rank_increase: u16,
    ) -> Option<Ipv6Address> {
        let mut best: Option<&Parent> = None;

        for parent in parents.parents() {
            if parent.rank.is_infinite() || !self.acceptable(parent, min_hop_rank_increase) {
                continue;
            }

            best = Some(match best {
                None => parent,
                Some(current) => {
                    self.best_parent(preferred, current, parent, min_hop_rank_increase)
                }
            });
        }

        best.map(|p| p.address)
    }

    /// Select the better of two candidate DODAGs: grounded wins from
    /// floating, then the administrative preference, then the Rank.
    pub(crate) fn best_dag<'d>(&self, d1: &'d Dodag, d2: &'d Dodag) -> &'d Dodag {
        if d1.grounded != d2.grounded {
            return if d1.grounded { d1 } else { d2 };
        }

        if d1.preference != d2.preference {
            return if d1.preference > d2.preference {
                d1
            } else {
                d2
            };
        }

        if d2.rank.dag_rank() < d1.rank.dag_rank() {
            d2
        } else {
            d1
        }
    }

    /// Compute the Rank advertised when `parent` is the preferred parent.
    /// With no parent, `base_rank` is the rank to start from. Saturates at
    /// the infinite Rank.
    pub(crate) fn calculate_rank(
        &self,
        parent: Option<&Parent>,
        base_rank: u16,
        min_hop_rank_increase: u16,
    ) -> u16 {
        match self {
            Self::Of0(of) => of.calculate_rank(parent, base_rank, min_hop_rank_increase),
            Self::Mrhof(of) => of.calculate_rank(parent, base_rank),
        }
    }

    /// Whether this parent may become preferred at all.
    fn acceptable(&self, parent: &Parent, min_hop_rank_increase: u16) -> bool {
        match self {
            Self::Of0(of) => of.parent_is_acceptable(parent),
            Self::Mrhof(of) => {
                let _ = min_hop_rank_increase;
                of.parent_has_usable_link(parent)
            }
        }
    }

    /// The value to advertise in the DAG Metric Container, or `None` when
    /// this objective function does not emit one.
    pub(crate) fn metric_object(
        &self,
        mc: MetricContainerType,
        is_root: bool,
        preferred_parent: Option<&Parent>,
    ) -> Option<MetricObject> {
        match self {
            // OF0 operates without metric container.
            Self::Of0(_) => None,
            Self::Mrhof(of) => of.metric_object(mc, is_root, preferred_parent),
        }
    }

    /// Digest the status of an acknowledgement for a DAO this node sent.
    pub(crate) fn dao_ack_callback(&self, parent: &mut Parent, status: u8) {
        if status == DAO_ACK_UNABLE_TO_ADD_ROUTE_AT_ROOT {
            return;
        }

        // Both a rejection and a timeout punish the link as if ten packets
        // were needed, so the parent election moves away from this parent.
        if status >= DAO_ACK_UNABLE_TO_ACCEPT {
            self.neighbor_link_callback(parent, TransmissionStatus::Ok, 10);
        }
    }
}
