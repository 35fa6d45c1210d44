//! The control plane of RPL, the IPv6 Routing Protocol for Low-Power and
//! Lossy Networks ([RFC 6550]), with the two standard objective functions
//! OF0 ([RFC 6552]) and MRHOF ([RFC 6719]) and the efficient No-Path DAO
//! cleanup of [draft-ietf-roll-efficient-npdao].
//!
//! The crate ingests RPL control messages (DIS, DIO, DAO, DAO-ACK, DCO,
//! DCO-ACK) carried over ICMPv6, maintains the instance/DODAG/parent model
//! and the downward route tables, and produces the control messages to
//! transmit in response. It is *sans-IO*: nothing here touches a socket or
//! a radio. The host stack feeds received ICMPv6 payloads into
//! [`Rpl::process_icmp`], reports transmission outcomes through
//! [`Rpl::link_stats_packet_sent`], and drains outgoing messages with
//! [`Rpl::poll_transmit`], calling back no later than [`Rpl::poll_at`].
//!
//! Everything is bounded: parent sets, neighbor and route tables and the
//! transmit queue have fixed capacities (see [`config`]), and running out
//! of a slot is reported to the peer where the protocol defines a way to
//! (e.g. a DAO-ACK with an unable-to-accept status), never a panic.
//!
//! [RFC 6550]: https://datatracker.ietf.org/doc/html/rfc6550
//! [RFC 6552]: https://datatracker.ietf.org/doc/html/rfc6552
//! [RFC 6719]: https://datatracker.ietf.org/doc/html/rfc6719
//! [draft-ietf-roll-efficient-npdao]: https://datatracker.ietf.org/doc/html/draft-ietf-roll-efficient-npdao

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod config;
pub mod consts;
mod dag;
mod instance;
mod neighbors;
mod of;
mod parents;
mod rand;
mod rank;
mod relations;
mod routes;
mod trickle;

pub mod time;
pub mod wire;

mod process;

pub use dag::{Dodag, PrefixInfo};
pub use instance::{DodagConfiguration, Instance};
pub use neighbors::NeighborTable;
pub use of::{MetricContainerType, ObjectiveFunction, StepOfRank, TransmissionStatus};
pub use parents::{Parent, ParentSet};
pub use rank::Rank;
pub use relations::Relations;
pub use routes::{Route, RouteTable};

use crate::config::RPL_TRANSMIT_QUEUE_SIZE;
use crate::of::ObjectiveFunction0;
use crate::rand::Rand;
use crate::time::{Duration, Instant};
use crate::wire::{Ipv6Address, ModeOfOperation, RplInstanceId, RplRepr};

/// Statistics counters. The only user-visible surface of the failure paths,
/// next to the debug log.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub struct Stats {
    pub malformed_msgs: u32,
    pub mem_overflows: u32,

    pub dis_recvd: u32,
    pub dio_recvd: u32,
    pub dao_recvd: u32,
    pub dao_ack_recvd: u32,
    pub npdao_recvd: u32,
    pub dco_recvd: u32,
    pub dco_ack_recvd: u32,
    pub dco_ignored: u32,

    pub dio_sent: u32,
    pub dao_sent: u32,
    pub npdao_sent: u32,
    pub dco_sent: u32,

    pub dao_forwarded: u32,
    pub npdao_forwarded: u32,
    pub dco_forwarded: u32,
}

/// An outgoing control message, produced by [`Rpl::poll_transmit`]. The
/// host wraps it in an IPv6 header with a hop limit of 255 and sends it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Transmit {
    pub dst_addr: Ipv6Address,
    pub msg: RplRepr,
}

impl Transmit {
    /// The buffer size needed to serialize this message.
    pub fn buffer_len(&self) -> usize {
        self.msg.buffer_len()
    }

    /// Serialize the message into an ICMPv6 payload buffer, computing the
    /// checksum over the pseudo header. Returns the number of bytes
    /// written.
    ///
    /// # Panics
    /// Panics when the buffer is smaller than [`Self::buffer_len`].
    pub fn emit(&self, src_addr: &Ipv6Address, buffer: &mut [u8]) -> usize {
        let len = self.buffer_len();
        let mut packet = wire::Icmpv6Packet::new_unchecked(&mut buffer[..len]);
        self.msg.emit(&mut packet);
        packet.fill_checksum(src_addr, &self.dst_addr);
        len
    }
}

/// Configuration of the root role of a node.
#[derive(Debug, Clone, Copy)]
pub struct RootConfig {
    pub dodag_id: Ipv6Address,
    pub preference: u8,
    pub grounded: bool,
    pub prefix_info: Option<PrefixInfo>,
}

impl RootConfig {
    pub fn new(dodag_id: Ipv6Address) -> Self {
        Self {
            dodag_id,
            preference: 0,
            grounded: false,
            prefix_info: None,
        }
    }
}

/// Configuration of a RPL node, in the builder style.
#[derive(Debug)]
pub struct Config {
    instance_id: RplInstanceId,
    mode_of_operation: ModeOfOperation,
    ocp: u16,
    of0_step_of_rank: StepOfRank,
    metric_container: MetricContainerType,
    root: Option<RootConfig>,
    leaf_only: bool,
    with_dao_ack: bool,
    with_dco: bool,
    with_dco_ack: bool,
    repair_on_dao_nack: bool,
    dio_refresh_dao_routes: bool,
    rand_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(RplInstanceId::from(consts::DEFAULT_RPL_INSTANCE_ID))
    }
}

impl Config {
    pub fn new(instance_id: RplInstanceId) -> Self {
        Self {
            instance_id,
            mode_of_operation: ModeOfOperation::default(),
            ocp: ObjectiveFunction0::OCP,
            of0_step_of_rank: StepOfRank::default(),
            metric_container: MetricContainerType::None,
            root: None,
            leaf_only: false,
            with_dao_ack: true,
            with_dco: true,
            with_dco_ack: true,
            repair_on_dao_nack: false,
            dio_refresh_dao_routes: true,
            rand_seed: 0x17_2a_f8_51,
        }
    }

    /// Make this node the root of a DODAG.
    pub fn into_root(mut self, root: RootConfig) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_mode_of_operation(mut self, mop: ModeOfOperation) -> Self {
        self.mode_of_operation = mop;
        self
    }

    /// Select the objective function by its Objective Code Point.
    pub fn with_objective_code_point(mut self, ocp: u16) -> Self {
        self.ocp = ocp;
        self
    }

    pub fn with_of0_step_of_rank(mut self, step: StepOfRank) -> Self {
        self.of0_step_of_rank = step;
        self
    }

    pub fn with_metric_container(mut self, mc: MetricContainerType) -> Self {
        self.metric_container = mc;
        self
    }

    /// A leaf only attaches to a DODAG; it never extends it.
    pub fn with_leaf_only(mut self, leaf_only: bool) -> Self {
        self.leaf_only = leaf_only;
        self
    }

    pub fn with_dao_ack(mut self, with_dao_ack: bool) -> Self {
        self.with_dao_ack = with_dao_ack;
        self
    }

    /// Enable the efficient No-Path DAO cleanup (DCO) machinery.
    pub fn with_dco(mut self, with_dco: bool) -> Self {
        self.with_dco = with_dco;
        self
    }

    pub fn with_dco_ack(mut self, with_dco_ack: bool) -> Self {
        self.with_dco_ack = with_dco_ack;
        self
    }

    /// Trigger a local repair when our own DAO is refused upstream.
    pub fn with_repair_on_dao_nack(mut self, repair: bool) -> Self {
        self.repair_on_dao_nack = repair;
        self
    }

    /// Make the root increment its DTSN on multicast DIOs, soliciting
    /// refreshed downward routes.
    pub fn with_dio_refresh_dao_routes(mut self, refresh: bool) -> Self {
        self.dio_refresh_dao_routes = refresh;
        self
    }

    pub fn with_rand_seed(mut self, seed: u64) -> Self {
        self.rand_seed = seed;
        self
    }
}

/// A RPL node: the instance it participates in, its neighbor and route
/// tables, and the queue of control messages awaiting transmission.
#[derive(Debug)]
pub struct Rpl {
    pub(crate) is_root: bool,
    pub(crate) leaf_only: bool,
    pub(crate) with_dao_ack: bool,
    pub(crate) with_dco: bool,
    pub(crate) with_dco_ack: bool,
    pub(crate) repair_on_dao_nack: bool,
    pub(crate) dio_refresh_dao_routes: bool,

    /// The node's global address, the target of its own DAOs. Without one,
    /// no DAO is originated.
    pub(crate) global_address: Option<Ipv6Address>,

    pub(crate) instance: Instance,
    pub(crate) neighbors: NeighborTable,
    pub(crate) routes: RouteTable,
    pub(crate) relations: Relations,

    pub(crate) dis_expiration: Instant,

    pub(crate) rand: Rand,
    pub(crate) stats: Stats,

    pub(crate) queue: heapless::Deque<Transmit, RPL_TRANSMIT_QUEUE_SIZE>,
}

impl Rpl {
    pub fn new(config: Config, now: Instant) -> Self {
        let mut rand = Rand::new(config.rand_seed);

        let of = match config.ocp {
            ObjectiveFunction0::OCP => {
                ObjectiveFunction::Of0(ObjectiveFunction0::new(config.of0_step_of_rank))
            }
            ocp => ObjectiveFunction::from_ocp(ocp).unwrap_or_default(),
        };

        let mut instance = Instance::new(
            config.instance_id,
            config.mode_of_operation,
            of,
            config.metric_container,
        );

        if let Some(root) = &config.root {
            instance.dodag = Some(Dodag {
                id: root.dodag_id,
                version_number: Default::default(),
                rank: Rank::ROOT,
                grounded: root.grounded,
                preference: root.preference,
                joined: true,
                prefix_info: root.prefix_info,
                parents: Default::default(),
                preferred_parent: None,
                dio_timer: crate::trickle::TrickleTimer::default(now, &mut rand),
            });
        }

        Self {
            is_root: config.root.is_some(),
            leaf_only: config.leaf_only,
            with_dao_ack: config.with_dao_ack,
            with_dco: config.with_dco,
            with_dco_ack: config.with_dco_ack,
            repair_on_dao_nack: config.repair_on_dao_nack,
            dio_refresh_dao_routes: config.dio_refresh_dao_routes,
            global_address: None,
            instance,
            neighbors: Default::default(),
            routes: Default::default(),
            relations: Default::default(),
            dis_expiration: now + Duration::from_secs(consts::DIS_START_DELAY as u64),
            rand,
            stats: Default::default(),
            queue: Default::default(),
        }
    }

    /// Set the node's global address, used as the target of its own DAOs.
    pub fn set_global_address(&mut self, address: Ipv6Address) {
        self.global_address = Some(address);
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The storing-mode downward route table, for the host to mirror into
    /// its forwarding plane.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The source-route graph of a non-storing root.
    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn has_parent(&self) -> bool {
        self.instance
            .dodag
            .as_ref()
            .is_some_and(|dodag| dodag.preferred_parent.is_some())
    }

    /// Queue a message for transmission. A full queue drops the message;
    /// every message here is eventually re-triggered by the protocol.
    pub(crate) fn transmit(&mut self, dst_addr: Ipv6Address, msg: RplRepr) {
        if self.queue.push_back(Transmit { dst_addr, msg }).is_err() {
            self.stats.mem_overflows += 1;
            net_debug!("transmit queue full, dropping message");
        }
    }
}
