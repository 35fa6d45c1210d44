//! Objective Function Zero, see [RFC 6552]. OF0 knows no metric container;
//! the step of rank is either the fixed default or derived from the ETX of
//! the link, mapped into the `[1, 9]` range.
//!
//! [RFC 6552]: https://datatracker.ietf.org/doc/html/rfc6552

use crate::consts::ETX_DIVISOR;
use crate::parents::Parent;
use crate::wire::Ipv6Address;

/// How OF0 derives its step of rank, see [RFC 6552 § 4.1].
///
/// [RFC 6552 § 4.1]: https://datatracker.ietf.org/doc/html/rfc6552#section-4.1
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOfRank {
    /// The default scalar value of 3.
    Fixed,
    /// A mapping of the link ETX onto `[1, 9]`, as suggested for the
    /// 6TiSCH WG.
    #[default]
    EtxBased,
}

#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObjectiveFunction0 {
    step_of_rank: StepOfRank,
}

impl ObjectiveFunction0 {
    pub const OCP: u16 = 0;

    const RANK_STRETCH: u16 = 0;
    const RANK_FACTOR: u16 = 1;

    const MIN_STEP_OF_RANK: u16 = 1;
    const MAX_STEP_OF_RANK: u16 = 9;

    pub fn new(step_of_rank: StepOfRank) -> Self {
        Self { step_of_rank }
    }

    fn step_of_rank(&self, parent: &Parent) -> u16 {
        match self.step_of_rank {
            StepOfRank::Fixed => 3,
            StepOfRank::EtxBased => (((3 * parent.link_metric as u32) / ETX_DIVISOR as u32)
                .saturating_sub(2))
            .min(u16::MAX as u32) as u16,
        }
    }

    fn rank_increase(&self, parent: &Parent, min_hop_rank_increase: u16) -> u32 {
        (Self::RANK_FACTOR * self.step_of_rank(parent) + Self::RANK_STRETCH) as u32
            * min_hop_rank_increase as u32
    }

    /// A parent is acceptable when its step of rank lies in `[1, 9]`: the
    /// link is neither too good to be true nor unusably lossy.
    pub(crate) fn parent_is_acceptable(&self, parent: &Parent) -> bool {
        let step = self.step_of_rank(parent);
        (Self::MIN_STEP_OF_RANK..=Self::MAX_STEP_OF_RANK).contains(&step)
    }

    /// The Rank this node would advertise through `parent`.
    pub(crate) fn rank_via_parent(&self, parent: &Parent, min_hop_rank_increase: u16) -> u16 {
        (parent.rank.raw_value() as u32 + self.rank_increase(parent, min_hop_rank_increase))
            .min(u16::MAX as u32) as u16
    }

    pub(crate) fn calculate_rank(
        &self,
        parent: Option<&Parent>,
        base_rank: u16,
        min_hop_rank_increase: u16,
    ) -> u16 {
        match parent {
            Some(parent) => self.rank_via_parent(parent, min_hop_rank_increase),
            None if base_rank == 0 => u16::MAX,
            None => {
                // Without a parent the default increment applies.
                (base_rank as u32
                    + ((Self::RANK_FACTOR * 3 + Self::RANK_STRETCH) as u32
                        * min_hop_rank_increase as u32))
                    .min(u16::MAX as u32) as u16
            }
        }
    }

    /// Compare two parents by looking both at their Rank and at the ETX of
    /// their link, and keep the currently preferred parent when the
    /// difference is too small to justify the churn of switching.
    pub(crate) fn best_parent<'p>(
        &self,
        preferred: Option<&Ipv6Address>,
        p1: &'p Parent,
        p2: &'p Parent,
        min_hop_rank_increase: u16,
    ) -> &'p Parent {
        // Both parents are in the same DODAG, so one MinHopRankIncrease
        // applies to both.
        let min_difference =
            (min_hop_rank_increase + min_hop_rank_increase / 2) as u32;

        let r1 = p1.rank.dag_rank() as u32 * min_hop_rank_increase as u32
            + p1.link_metric as u32;
        let r2 = p2.rank.dag_rank() as u32 * min_hop_rank_increase as u32
            + p2.link_metric as u32;

        if r1.abs_diff(r2) < min_difference {
            if Some(&p1.address) == preferred {
                return p1;
            }
            if Some(&p2.address) == preferred {
                return p2;
            }
        }

        if r1 < r2 {
            p1
        } else {
            p2
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
    fn step_of_rank_mapping() {
        let of = ObjectiveFunction0::default();

        // A perfect link (ETX 1.0) maps to the minimum step.
        assert!(of.parent_is_acceptable(&parent(1, 256, 128)));
        // An unusably lossy link maps above the maximum step.
        assert!(!of.parent_is_acceptable(&parent(1, 256, 128 * 4)));

        let of = ObjectiveFunction0::new(StepOfRank::Fixed);
        assert!(of.parent_is_acceptable(&parent(1, 256, 128 * 4)));
    }

    #[test]
    fn rank_via_parent() {
        let of = ObjectiveFunction0::new(StepOfRank::Fixed);

        // A fixed step of 3 gives an increase of 3 * MinHopRankIncrease.
        assert_eq!(of.rank_via_parent(&parent(1, 256, 128), 256), 256 + 768);

        // The rank saturates at the infinite rank.
        assert_eq!(of.rank_via_parent(&parent(1, 0xfff0, 128), 256), u16::MAX);
    }

    #[test]
    fn hysteresis() {
        let of = ObjectiveFunction0::default();

        // Same advertised rank, slightly different ETX: the difference of
        // 12 is far below MIN_DIFFERENCE (384), so the current preferred
        // parent wins.
        let a = parent(1, 256, 128);
        let b = parent(2, 256, 140);

        assert_eq!(
            of.best_parent(Some(&a.address), &a, &b, 256).address,
            a.address
        );
        assert_eq!(
            of.best_parent(Some(&b.address), &a, &b, 256).address,
            b.address
        );

        // Without hysteresis in play, the lower combination wins.
        let c = parent(3, 1024, 128);
        assert_eq!(of.best_parent(None, &a, &c, 256).address, a.address);
    }
}
