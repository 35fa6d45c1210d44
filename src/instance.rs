//! The RPL instance: the DODAG configuration in force, the objective
//! function it selects, the sequence counters the instance owns, and the
//! bookkeeping for the DAO this node itself registered upward.

use crate::consts;
use crate::dag::Dodag;
use crate::of::{MetricContainerType, ObjectiveFunction};
use crate::time::Instant;
use crate::wire::rpl::options;
use crate::wire::{ModeOfOperation, RplInstanceId, SequenceCounter};

/// The parameters a root distributes through the DODAG Configuration
/// option, and every other node learns from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DodagConfiguration {
    pub authentication_enabled: bool,
    pub path_control_size: u8,
    pub dio_interval_doublings: u8,
    pub dio_interval_min: u8,
    pub dio_redundancy_constant: u8,
    pub max_rank_increase: u16,
    pub minimum_hop_rank_increase: u16,
    pub objective_code_point: u16,
    pub default_lifetime: u8,
    pub lifetime_unit: u16,
}

impl Default for DodagConfiguration {
    fn default() -> Self {
        Self {
            authentication_enabled: false,
            path_control_size: 0,
            dio_interval_doublings: consts::DEFAULT_DIO_INTERVAL_DOUBLINGS,
            dio_interval_min: consts::DEFAULT_DIO_INTERVAL_MIN,
            dio_redundancy_constant: consts::DEFAULT_DIO_REDUNDANCY_CONSTANT,
            max_rank_increase: 7 * consts::DEFAULT_MIN_HOP_RANK_INCREASE,
            minimum_hop_rank_increase: consts::DEFAULT_MIN_HOP_RANK_INCREASE,
            objective_code_point: 0,
            default_lifetime: consts::DEFAULT_ROUTE_LIFETIME,
            lifetime_unit: consts::DEFAULT_LIFETIME_UNIT,
        }
    }
}

impl From<&options::DodagConfiguration> for DodagConfiguration {
    fn from(opt: &options::DodagConfiguration) -> Self {
        Self {
            authentication_enabled: opt.authentication_enabled,
            path_control_size: opt.path_control_size,
            dio_interval_doublings: opt.dio_interval_doublings,
            dio_interval_min: opt.dio_interval_min,
            dio_redundancy_constant: opt.dio_redundancy_constant,
            max_rank_increase: opt.max_rank_increase,
            minimum_hop_rank_increase: opt.minimum_hop_rank_increase,
            objective_code_point: opt.objective_code_point,
            default_lifetime: opt.default_lifetime,
            lifetime_unit: opt.lifetime_unit,
        }
    }
}

impl DodagConfiguration {
    pub(crate) fn to_option(self) -> options::Repr {
        options::Repr::DodagConfiguration(options::DodagConfiguration {
            authentication_enabled: self.authentication_enabled,
            path_control_size: self.path_control_size,
            dio_interval_doublings: self.dio_interval_doublings,
            dio_interval_min: self.dio_interval_min,
            dio_redundancy_constant: self.dio_redundancy_constant,
            max_rank_increase: self.max_rank_increase,
            minimum_hop_rank_increase: self.minimum_hop_rank_increase,
            objective_code_point: self.objective_code_point,
            default_lifetime: self.default_lifetime,
            lifetime_unit: self.lifetime_unit,
        })
    }
}

/// A RPL instance this node participates in.
#[derive(Debug)]
pub struct Instance {
    pub(crate) id: RplInstanceId,
    pub(crate) mode_of_operation: ModeOfOperation,
    pub(crate) of: ObjectiveFunction,
    pub(crate) metric_container: MetricContainerType,
    pub(crate) dodag_conf: DodagConfiguration,

    /// The DODAG of this instance, once one is known.
    pub(crate) dodag: Option<Dodag>,

    /// DTSN advertised in outgoing DIOs; incremented to solicit fresh DAOs.
    pub(crate) dtsn_out: SequenceCounter,

    // The sequence spaces this instance owns.
    pub(crate) dao_sequence: SequenceCounter,
    pub(crate) dco_sequence: SequenceCounter,
    pub(crate) path_sequence: SequenceCounter,

    // State of the DAO this node itself sent upward.
    pub(crate) my_dao_seqno: u8,
    pub(crate) my_dao_transmissions: u8,
    pub(crate) dao_retransmit_at: Option<Instant>,
    /// When to advertise our own target next, `None` while nothing is due.
    pub(crate) dao_expiration: Option<Instant>,
    pub(crate) has_downward_route: bool,
}

impl Instance {
    pub(crate) fn new(
        id: RplInstanceId,
        mode_of_operation: ModeOfOperation,
        of: ObjectiveFunction,
        metric_container: MetricContainerType,
    ) -> Self {
        let dodag_conf = DodagConfiguration {
            objective_code_point: of.ocp(),
            ..Default::default()
        };

        Self {
            id,
            mode_of_operation,
            of,
            metric_container,
            dodag_conf,
            dodag: None,
            dtsn_out: SequenceCounter::default(),
            dao_sequence: SequenceCounter::default(),
            dco_sequence: SequenceCounter::default(),
            path_sequence: SequenceCounter::default(),
            my_dao_seqno: 0,
            my_dao_transmissions: 0,
            dao_retransmit_at: None,
            dao_expiration: None,
            has_downward_route: false,
        }
    }

    pub fn id(&self) -> RplInstanceId {
        self.id
    }

    pub fn mode_of_operation(&self) -> ModeOfOperation {
        self.mode_of_operation
    }

    pub fn dodag(&self) -> Option<&Dodag> {
        self.dodag.as_ref()
    }

    pub fn has_downward_route(&self) -> bool {
        self.has_downward_route
    }

    /// Whether this instance maintains downward routes in the routers.
    pub(crate) fn is_storing(&self) -> bool {
        matches!(
            self.mode_of_operation,
            ModeOfOperation::StoringModeWithoutMulticast
                | ModeOfOperation::StoringModeWithMulticast
        )
    }

    pub(crate) fn is_non_storing(&self) -> bool {
        self.mode_of_operation == ModeOfOperation::NonStoringMode
    }

    /// The lifetime of a route in seconds, from the lifetime field of a
    /// transit option. The all-ones pair means the route never expires.
    pub(crate) fn lifetime_secs(&self, lifetime: u8) -> u32 {
        if self.dodag_conf.lifetime_unit == 0xffff && lifetime == 0xff {
            u32::MAX
        } else {
            lifetime as u32 * self.dodag_conf.lifetime_unit as u32
        }
    }

    /// Whether a missing acknowledgement should be tolerated silently: a
    /// legacy root using infinite lifetimes probably does not implement
    /// DAO-ACK at all.
    pub(crate) fn uses_legacy_lifetimes(&self) -> bool {
        self.dodag_conf.lifetime_unit == 0xffff && self.dodag_conf.default_lifetime == 0xff
    }

    /// Update the configuration from a received DODAG Configuration option
    /// and switch objective function if the OCP asks for one we implement.
    pub(crate) fn update_dodag_conf(&mut self, conf: &options::DodagConfiguration) {
        if self.dodag_conf.objective_code_point != conf.objective_code_point {
            if let Some(of) = ObjectiveFunction::from_ocp(conf.objective_code_point) {
                self.of = of;
            }
        }

        self.dodag_conf = conf.into();
    }
}
