//! ID types handed out by the kernel

use core::fmt;

/// Identifier of a created node (1-based, contiguous in creation order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new node ID
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Zero-based slot in the kernel node table
    pub(crate) const fn slot(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// Node id for a zero-based slot
    pub(crate) const fn from_slot(slot: usize) -> Self {
        Self(slot as u64 + 1)
    }

    /// Virtual process owning connections that target this node
    pub(crate) const fn shard(&self, threads: usize) -> usize {
        (self.0 % threads as u64) as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a connection set held by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionSetId {
    /// Kernel generation the handle was issued in
    pub(crate) generation: u32,
    /// Slot in the kernel's query table
    pub(crate) index: u32,
}

impl ConnectionSetId {
    /// Handle for slot `index` in kernel generation `generation`
    pub const fn new(generation: u32, index: u32) -> Self {
        Self { generation, index }
    }

    /// Kernel generation the handle belongs to
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Slot in the query table
    pub const fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for ConnectionSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}.{}", self.generation, self.index)
    }
}

/// Position of a stored connection: (shard, offset within shard)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EdgeRef {
    pub shard: u32,
    pub offset: u32,
}

impl EdgeRef {
    pub(crate) const fn new(shard: usize, offset: usize) -> Self {
        Self {
            shard: shard as u32,
            offset: offset as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.slot(), 41);
        assert_eq!(NodeId::from_slot(41), id);
        assert_eq!(format!("{}", id), "42");
    }

    #[test]
    fn test_shard_assignment() {
        assert_eq!(NodeId::new(7).shard(1), 0);
        assert_eq!(NodeId::new(7).shard(4), 3);
        assert_eq!(NodeId::new(8).shard(4), 0);
    }

    #[test]
    fn test_connection_set_display() {
        let id = ConnectionSetId::new(2, 5);
        assert_eq!(id.to_string(), "C2.5");
        assert!(ConnectionSetId::new(1, 9) < ConnectionSetId::new(2, 0));
    }
}
