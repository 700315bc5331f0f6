//! Identity types for the pipeline system.
//!
//! A `NodeId` is a newtype over `u32` that serves as a direct index into
//! `Topology::nodes`. Channels hold `NodeId`s rather than node references,
//! so a subscriber's lifetime is owned by the topology alone.

use std::fmt;

/// Index into `Topology::nodes`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
