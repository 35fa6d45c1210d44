//! The Minimum Rank with Hysteresis Objective Function, see [RFC 6719].
//! MRHOF minimizes the path ETX toward the root and only switches preferred
//! parent when the gain crosses a threshold, keeping the topology stable
//! under metric jitter.
//!
//! [RFC 6719]: https://datatracker.ietf.org/doc/html/rfc6719

use super::{MetricContainerType, TransmissionStatus};
use crate::consts::{ETX_DIVISOR, INIT_LINK_METRIC, MAX_LINK_METRIC, MAX_PATH_COST};
use crate::parents::Parent;
use crate::wire::rpl::options::MetricObject;
use crate::wire::Ipv6Address;

/// Constants for the ETX moving average.
const ETX_SCALE: u32 = 100;
const ETX_ALPHA: u32 = 90;

/// The rank must differ by more than 1/PARENT_SWITCH_THRESHOLD_DIV of the
/// ETX divisor in order to switch preferred parent.
const PARENT_SWITCH_THRESHOLD_DIV: u16 = 2;

/// Node energy type field of the energy metric object.
const ENERGY_TYPE_MAINS: u8 = 0;
const ENERGY_TYPE_BATTERY: u8 = 1;
const ENERGY_TYPE_SHIFT: u8 = 1;

/// Fold a transmission outcome into the smoothed link ETX of a parent.
///
/// A transmission that was never acknowledged counts as the worst usable
/// link; collisions and radio errors do not penalize the estimate.
pub(crate) fn update_link_metric(parent: &mut Parent, status: TransmissionStatus, numtx: u8) {
    let packet_etx = match status {
        TransmissionStatus::Ok => numtx as u32 * ETX_DIVISOR as u32,
        TransmissionStatus::NoAck => (MAX_LINK_METRIC * ETX_DIVISOR) as u32,
        TransmissionStatus::Collision | TransmissionStatus::Err => return,
    };

    let recorded_etx = parent.link_metric as u32;
    let new_etx = (recorded_etx * ETX_ALPHA + packet_etx * (ETX_SCALE - ETX_ALPHA)) / ETX_SCALE;

    net_trace!(
        "ETX of {} changed from {} to {} (packet ETX {})",
        parent.address,
        recorded_etx / ETX_DIVISOR as u32,
        new_etx / ETX_DIVISOR as u32,
        packet_etx / ETX_DIVISOR as u32
    );

    parent.link_metric = new_etx.min(u16::MAX as u32) as u16;
}

#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mrhof;

impl Mrhof {
    pub const OCP: u16 = 1;

    /// The cost of the path toward the root through `parent`: the cost the
    /// parent advertised plus the cost of the link to it. When the DODAG
    /// aggregates a metric container, its value replaces the Rank as the
    /// advertised part.
    pub(crate) fn path_metric(&self, parent: Option<&Parent>) -> u16 {
        let Some(parent) = parent else {
            return MAX_PATH_COST.saturating_mul(ETX_DIVISOR);
        };

        let advertised = match parent.metric {
            Some(MetricObject::Etx(etx)) => etx as u32,
            Some(MetricObject::Energy { estimation, .. }) => estimation as u32,
            None => parent.rank.raw_value() as u32,
        };

        (advertised + parent.link_metric as u32).min(u16::MAX as u32) as u16
    }

    pub(crate) fn calculate_rank(&self, parent: Option<&Parent>, base_rank: u16) -> u16 {
        let (base_rank, rank_increase) = match parent {
            None if base_rank == 0 => return u16::MAX,
            // The initial advertisement, before any transmission happened.
            None => (base_rank, INIT_LINK_METRIC * ETX_DIVISOR),
            Some(parent) => (
                if base_rank == 0 {
                    parent.rank.raw_value()
                } else {
                    base_rank
                },
                parent.link_metric,
            ),
        };

        if u16::MAX - base_rank < rank_increase {
            u16::MAX
        } else {
            base_rank + rank_increase
        }
    }

    /// A parent is usable when neither its link metric nor the path cost
    /// through it crosses the configured maxima.
    pub(crate) fn parent_has_usable_link(&self, parent: &Parent) -> bool {
        parent.link_metric <= MAX_LINK_METRIC * ETX_DIVISOR
            && self.path_metric(Some(parent)) <= MAX_PATH_COST.saturating_mul(ETX_DIVISOR)
    }

    /// Pick the parent with the lower path cost, keeping the currently
    /// preferred parent as long as the difference stays below the switch
    /// threshold.
    pub(crate) fn best_parent<'p>(
        &self,
        preferred: Option<&Ipv6Address>,
        p1: &'p Parent,
        p2: &'p Parent,
    ) -> &'p Parent {
        let min_diff = ETX_DIVISOR / PARENT_SWITCH_THRESHOLD_DIV;

        let m1 = self.path_metric(Some(p1));
        let m2 = self.path_metric(Some(p2));

        if (Some(&p1.address) == preferred || Some(&p2.address) == preferred)
            && m1.abs_diff(m2) < min_diff
        {
            if Some(&p1.address) == preferred {
                return p1;
            }
            return p2;
        }

        if m1 < m2 {
            p1
        } else {
            p2
        }
    }

    /// The metric object to advertise in outgoing DIOs. The root advertises
    /// a zero path cost; everyone else advertises the cost through its
    /// preferred parent.
    pub(crate) fn metric_object(
        &self,
        mc: MetricContainerType,
        is_root: bool,
        preferred_parent: Option<&Parent>,
    ) -> Option<MetricObject> {
        let path_metric = if is_root {
            0
        } else {
            self.path_metric(preferred_parent)
        };

        match mc {
            MetricContainerType::None => None,
            MetricContainerType::Etx => Some(MetricObject::Etx(path_metric)),
            MetricContainerType::Energy => {
                let energy_type = if is_root {
                    ENERGY_TYPE_MAINS
                } else {
                    ENERGY_TYPE_BATTERY
                };

                Some(MetricObject::Energy {
                    flags: energy_type << ENERGY_TYPE_SHIFT,
                    estimation: (path_metric / ETX_DIVISOR).min(u8::MAX as u16) as u8,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_MIN_HOP_RANK_INCREASE;
    use crate::rank::Rank;
    use crate::time::Instant;

    fn parent(last: u8, rank: u16, link_metric: u16) -> Parent {
        let mut address = Ipv6Address::default();
        address.0[15] = last;

        let mut parent = Parent::new(
            address,
            Rank::new(rank, DEFAULT_MIN_HOP_RANK_INCREASE),
            0,
            Default::default(),
            Instant::ZERO,
        );
        parent.link_metric = link_metric;
        parent
    }

    #[test]
    fn ewma() {
        let mut p = parent(1, 256, 2 * ETX_DIVISOR);

        // A first-try acknowledgement pulls the estimate toward 1.0.
        update_link_metric(&mut p, TransmissionStatus::Ok, 1);
        assert_eq!(
            p.link_metric as u32,
            (2 * ETX_DIVISOR as u32 * 90 + ETX_DIVISOR as u32 * 10) / 100
        );

        // A lost frame counts as the worst usable link.
        let mut p = parent(1, 256, 2 * ETX_DIVISOR);
        update_link_metric(&mut p, TransmissionStatus::NoAck, 3);
        assert_eq!(
            p.link_metric as u32,
            (2 * ETX_DIVISOR as u32 * 90 + (MAX_LINK_METRIC * ETX_DIVISOR) as u32 * 10) / 100
        );

        // Collisions and radio errors leave the estimate alone.
        let mut p = parent(1, 256, 2 * ETX_DIVISOR);
        update_link_metric(&mut p, TransmissionStatus::Collision, 3);
        update_link_metric(&mut p, TransmissionStatus::Err, 3);
        assert_eq!(p.link_metric, 2 * ETX_DIVISOR);
    }

    #[test]
    fn path_metric() {
        let of = Mrhof;

        // Without a metric container the advertised rank is the base.
        assert_eq!(of.path_metric(Some(&parent(1, 256, 128))), 256 + 128);

        // A negotiated ETX container replaces the rank.
        let mut p = parent(1, 256, 128);
        p.metric = Some(MetricObject::Etx(512));
        assert_eq!(of.path_metric(Some(&p)), 512 + 128);

        // No parent at all is the maximum path cost.
        assert_eq!(of.path_metric(None), MAX_PATH_COST * ETX_DIVISOR);
    }

    #[test]
    fn switch_threshold() {
        let of = Mrhof;

        // path metrics 300 and 200: the difference of 100 crosses the
        // threshold of 64, so the new parent wins despite hysteresis.
        let a = parent(1, 200, 100);
        let b = parent(2, 100, 100);
        assert_eq!(of.best_parent(Some(&a.address), &a, &b).address, b.address);

        // A difference below the threshold keeps the preferred parent.
        let c = parent(3, 240, 100);
        assert_eq!(of.best_parent(Some(&a.address), &a, &c).address, a.address);
        assert_eq!(of.best_parent(Some(&c.address), &a, &c).address, c.address);
    }

    #[test]
    fn usable_link() {
        let of = Mrhof;

        assert!(of.parent_has_usable_link(&parent(1, 256, 2 * ETX_DIVISOR)));
        // Link worse than MAX_LINK_METRIC.
        assert!(!of.parent_has_usable_link(&parent(1, 256, 11 * ETX_DIVISOR)));
        // Path cost worse than MAX_PATH_COST.
        assert!(!of.parent_has_usable_link(&parent(1, u16::MAX - 128, 128)));
    }

    #[test]
    fn rank_saturation() {
        let of = Mrhof;

        assert_eq!(of.calculate_rank(None, 0), u16::MAX);
        assert_eq!(
            of.calculate_rank(None, 256),
            256 + INIT_LINK_METRIC * ETX_DIVISOR
        );
        assert_eq!(of.calculate_rank(Some(&parent(1, 512, 128)), 0), 512 + 128);
        assert_eq!(
            of.calculate_rank(Some(&parent(1, u16::MAX - 64, 128)), 0),
            u16::MAX
        );
    }
}
