//! Compile-time capacities of the bounded tables and buffers.
//!
//! Everything in this crate is fixed-capacity; running out of a slot is a
//! reportable protocol outcome, not an allocation failure.

/// Maximum number of options parsed from one control message.
pub const RPL_MAX_OPTIONS: usize = 4;

/// Capacity of the parent set of a DODAG.
pub const RPL_PARENTS_BUFFER_COUNT: usize = 8;

/// Capacity of the neighbor admission table.
pub const RPL_NEIGHBOR_TABLE_SIZE: usize = 16;

/// Capacity of the storing-mode downward route table.
pub const RPL_ROUTES_BUFFER_COUNT: usize = 16;

/// Capacity of the non-storing source-route graph at the root.
pub const RPL_RELATIONS_BUFFER_COUNT: usize = 16;

/// Capacity of the queue of outgoing control messages.
pub const RPL_TRANSMIT_QUEUE_SIZE: usize = 8;
