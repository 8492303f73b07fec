//! Node collections: the handle returned by population creation

use crate::{error::*, NodeId};
use core::fmt;
use core::ops::Range;

/// Contiguous run of node ids returned by [`crate::Kernel::create`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeCollection {
    first: NodeId,
    len: usize,
}

impl NodeCollection {
    /// Collection of `len` consecutive ids starting at `first`
    pub fn new(first: NodeId, len: usize) -> Self {
        Self { first, len }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the collection holds no nodes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First node id
    pub fn first(&self) -> NodeId {
        self.first
    }

    /// Last node id
    pub fn last(&self) -> NodeId {
        NodeId::new(self.first.raw() + self.len.saturating_sub(1) as u64)
    }

    /// Whether `id` belongs to this collection
    pub fn contains(&self, id: NodeId) -> bool {
        id.raw() >= self.first.raw() && id.raw() < self.first.raw() + self.len as u64
    }

    /// Node id at position `index`
    pub fn id_at(&self, index: usize) -> Result<NodeId> {
        if index >= self.len {
            return Err(KernelError::IndexOutOfRange { index, len: self.len });
        }
        Ok(NodeId::new(self.first.raw() + index as u64))
    }

    /// Single-node collection at position `index`
    pub fn at(&self, index: usize) -> Result<NodeCollection> {
        Ok(Self::new(self.id_at(index)?, 1))
    }

    /// Sub-collection covering `range`
    pub fn slice(&self, range: Range<usize>) -> Result<NodeCollection> {
        if range.start > range.end || range.end > self.len {
            return Err(KernelError::IndexOutOfRange {
                index: range.end,
                len: self.len,
            });
        }
        Ok(Self::new(
            NodeId::new(self.first.raw() + range.start as u64),
            range.end - range.start,
        ))
    }

    /// Iterate node ids in order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        (0..self.len).map(move |i| NodeId::new(self.first.raw() + i as u64))
    }
}

impl fmt::Display for NodeCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeCollection(first={}, last={}, len={})", self.first, self.last(), self.len)
    }
}
