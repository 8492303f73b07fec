//! Connection table sharded by virtual process

use crate::{
    connection::{Connection, SynapseSpec},
    ids::EdgeRef,
    NodeId,
};
use rayon::prelude::*;

/// Append-only connection table.
///
/// Connections live in the shard of their target (`target mod shards`), so each
/// worker owns the incoming edges of its nodes. Offsets inside a shard never
/// change once written.
#[derive(Debug, Default)]
pub struct ConnectionStore {
    shards: Vec<Vec<Connection>>,
    next_sequence: u64,
}

impl ConnectionStore {
    /// Create an empty store with `shards` partitions
    pub fn new(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| Vec::new()).collect(),
            next_sequence: 0,
        }
    }

    /// Number of partitions
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total number of stored connections
    pub fn len(&self) -> usize {
        self.shards.iter().map(Vec::len).sum()
    }

    /// True when no connection has been stored
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Vec::is_empty)
    }

    /// Append one connection per (source, target) pair using `spec`.
    ///
    /// Sequence numbers follow the order of `pairs`; shard appends run in
    /// parallel on the caller's pool.
    pub fn insert(&mut self, pairs: &[(NodeId, NodeId)], spec: &SynapseSpec) -> usize {
        let shard_count = self.shards.len();
        let mut buckets: Vec<Vec<Connection>> = (0..shard_count).map(|_| Vec::new()).collect();

        for (i, &(source, target)) in pairs.iter().enumerate() {
            buckets[target.shard(shard_count)].push(Connection {
                source,
                target,
                synapse_model: spec.synapse_model,
                weight: spec.weight,
                delay: spec.delay,
                receptor: spec.receptor_type,
                sequence: self.next_sequence + i as u64,
            });
        }
        self.next_sequence += pairs.len() as u64;

        self.shards
            .par_iter_mut()
            .zip(buckets.into_par_iter())
            .for_each(|(shard, bucket)| shard.extend(bucket));

        pairs.len()
    }

    /// Connection at `edge`
    pub(crate) fn get(&self, edge: EdgeRef) -> &Connection {
        &self.shards[edge.shard as usize][edge.offset as usize]
    }

    /// Mutable connection at `edge`
    pub(crate) fn get_mut(&mut self, edge: EdgeRef) -> &mut Connection {
        &mut self.shards[edge.shard as usize][edge.offset as usize]
    }

    /// Borrow all shards
    pub(crate) fn shards(&self) -> &[Vec<Connection>] {
        &self.shards
    }

    /// Iterate every stored connection with its position
    pub(crate) fn iter(&self) -> impl Iterator<Item = (EdgeRef, &Connection)> {
        self.shards.iter().enumerate().flat_map(|(shard, conns)| {
            conns
                .iter()
                .enumerate()
                .map(move |(offset, conn)| (EdgeRef::new(shard, offset), conn))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SynapseModel;

    fn pairs(n: u64) -> Vec<(NodeId, NodeId)> {
        (1..=n).map(|i| (NodeId::new(i), NodeId::new(i + 1))).collect()
    }

    #[test]
    fn test_insert_shards_by_target() {
        let mut store = ConnectionStore::new(4);
        let spec = SynapseSpec::new(SynapseModel::Stdp);
        assert_eq!(store.insert(&pairs(8), &spec), 8);

        assert_eq!(store.len(), 8);
        assert_eq!(store.shard_count(), 4);
        for (shard, conns) in store.shards().iter().enumerate() {
            assert_eq!(conns.len(), 2);
            assert!(conns.iter().all(|c| c.target.shard(4) == shard));
        }
    }

    #[test]
    fn test_sequence_numbers_are_global() {
        let mut store = ConnectionStore::new(3);
        let spec = SynapseSpec::default();
        store.insert(&pairs(5), &spec);
        store.insert(&pairs(5), &spec);

        let mut seqs: Vec<u64> = store.iter().map(|(_, c)| c.sequence).collect();
        seqs.sort_unstable();
        assert_eq!(seqs, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_edge_refs_are_stable() {
        let mut store = ConnectionStore::new(2);
        let spec = SynapseSpec::default();
        store.insert(&pairs(4), &spec);
        let (edge, first) = store.iter().next().map(|(e, c)| (e, c.clone())).unwrap();

        store.insert(&pairs(4), &spec);
        assert_eq!(store.get(edge), &first);

        store.get_mut(edge).weight = 9.0;
        assert_eq!(store.get(edge).weight, 9.0);
    }
}
