//! Protocol constants. The trickle timer and DODAG configuration defaults
//! deviate from the RFC 6550 values where noted; they are the values used
//! in deployed 6LoWPAN networks.

pub const DEFAULT_RPL_INSTANCE_ID: u8 = 0x1e;

pub const DEFAULT_MIN_HOP_RANK_INCREASE: u16 = 256;

/// This is 3 in the standard, but in Contiki they use:
pub const DEFAULT_DIO_INTERVAL_MIN: u8 = 12;
/// This is 20 in the standard, but in Contiki they use:
pub const DEFAULT_DIO_INTERVAL_DOUBLINGS: u8 = 8;
pub const DEFAULT_DIO_REDUNDANCY_CONSTANT: u8 = 10;

/// Default lifetime of a downward route, in lifetime units.
pub const DEFAULT_ROUTE_LIFETIME: u8 = 30;
/// Granularity of the route lifetime field, in seconds.
pub const DEFAULT_LIFETIME_UNIT: u16 = 60;

/// A route lifetime of zero announces the loss of reachability of a target
/// (a No-Path DAO).
pub const ZERO_LIFETIME: u8 = 0;

/// Time a route whose No-Path DAO was accepted lingers before removal, in
/// seconds, so that in-flight downward datagrams still find a next hop.
pub const NOPATH_REMOVAL_DELAY: u32 = 60;

/// Fixed point divisor of the ETX link metric: an ETX of 1.0 (a perfect
/// link) is stored as 128.
pub const ETX_DIVISOR: u16 = 128;

/// ETX assumed for a link no transmission has been attempted on yet.
pub const INIT_LINK_METRIC: u16 = 2;

/// Reject parents whose link metric is higher than this, in ETX units.
pub const MAX_LINK_METRIC: u16 = 10;

/// Reject parents whose path cost is higher than this, in ETX units.
pub const MAX_PATH_COST: u16 = 100;

/// Seconds before the first DIS of an unjoined node.
pub const DIS_START_DELAY: u32 = 5;

/// Seconds between the DISes of an unjoined node.
pub const DIS_INTERVAL: u32 = 60;

/// Delay before a freshly triggered DAO is sent, allowing a burst of
/// topology changes to collapse into one advertisement, in milliseconds.
pub const DAO_LATENCY_MILLIS: u64 = 4000;

/// Number of times a DAO that expects an acknowledgement is retransmitted.
pub const DAO_MAX_RETRANSMISSIONS: u8 = 5;

/// Milliseconds before an unacknowledged DAO is retransmitted.
pub const DAO_RETRANSMISSION_TIMEOUT_MILLIS: u64 = 5000;

/// DAO-ACK status: the DAO was accepted.
pub const DAO_ACK_UNCONDITIONAL_ACCEPT: u8 = 0;
/// DAO-ACK status: a router could not accept the advertised target.
pub const DAO_ACK_UNABLE_TO_ACCEPT: u8 = 0x80;
/// DAO-ACK status: the root could not install the advertised target.
pub const DAO_ACK_UNABLE_TO_ADD_ROUTE_AT_ROOT: u8 = 0x81;
/// Internal status reported to the objective function when every
/// retransmission of a DAO went unacknowledged. Never sent on the wire.
pub const DAO_ACK_TIMEOUT: u8 = 0xfe;

/// DCO-ACK status: no route entry exists for the cleaned-up target.
pub const DCO_ACK_NO_ROUTE: u8 = 234;

/// The `P` flag of an emitted DAG Metric Container: the value describes a
/// whole path, not a single node or link.
pub const DAG_MC_FLAG_P: u8 = 1 << 2;
