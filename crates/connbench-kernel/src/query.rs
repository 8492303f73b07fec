//! Connection queries and attribute extraction

use crate::{
    connection::Connection, error::*, ids::EdgeRef, models::SynapseModel, nodes::NodeCollection,
    store::ConnectionStore,
};
use core::fmt;
use core::str::FromStr;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Selection criteria for [`crate::Kernel::get_connections`]; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionFilter {
    /// Restrict to these sources
    pub sources: Option<NodeCollection>,
    /// Restrict to these targets
    pub targets: Option<NodeCollection>,
    /// Restrict to one synapse model
    pub synapse_model: Option<SynapseModel>,
    /// Inclusive lower weight bound
    pub min_weight: Option<f64>,
    /// Inclusive upper weight bound
    pub max_weight: Option<f64>,
    /// Inclusive lower delay bound
    pub min_delay: Option<f64>,
    /// Inclusive upper delay bound
    pub max_delay: Option<f64>,
}

impl ConnectionFilter {
    /// Filter matching every connection
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict sources
    pub fn with_sources(mut self, sources: NodeCollection) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Restrict targets
    pub fn with_targets(mut self, targets: NodeCollection) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Restrict the synapse model
    pub fn with_synapse_model(mut self, model: SynapseModel) -> Self {
        self.synapse_model = Some(model);
        self
    }

    /// Restrict weights to `[min, max]`
    pub fn with_weight_range(mut self, min: f64, max: f64) -> Self {
        self.min_weight = Some(min);
        self.max_weight = Some(max);
        self
    }

    /// Restrict delays to `[min, max]`
    pub fn with_delay_range(mut self, min: f64, max: f64) -> Self {
        self.min_delay = Some(min);
        self.max_delay = Some(max);
        self
    }

    /// Whether `conn` passes every set criterion
    pub fn matches(&self, conn: &Connection) -> bool {
        if let Some(sources) = &self.sources {
            if !sources.contains(conn.source) {
                return false;
            }
        }
        if let Some(targets) = &self.targets {
            if !targets.contains(conn.target) {
                return false;
            }
        }
        if let Some(model) = self.synapse_model {
            if conn.synapse_model != model {
                return false;
            }
        }
        let within = |value: f64, min: Option<f64>, max: Option<f64>| {
            min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
        };
        within(conn.weight, self.min_weight, self.max_weight)
            && within(conn.delay, self.min_delay, self.max_delay)
    }
}

/// Extractable per-connection attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    /// Presynaptic node id
    Source,
    /// Postsynaptic node id
    Target,
    /// Synaptic weight
    Weight,
    /// Transmission delay
    Delay,
    /// Receptor port
    Receptor,
    /// Synapse model
    SynapseModel,
    /// Creation sequence number
    Sequence,
}

impl Attribute {
    /// Every attribute, in canonical order
    pub const ALL: [Attribute; 7] = [
        Attribute::Source,
        Attribute::Target,
        Attribute::Weight,
        Attribute::Delay,
        Attribute::Receptor,
        Attribute::SynapseModel,
        Attribute::Sequence,
    ];

    /// Attribute name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
            Self::Weight => "weight",
            Self::Delay => "delay",
            Self::Receptor => "receptor",
            Self::SynapseModel => "synapse_model",
            Self::Sequence => "sequence",
        }
    }

    fn value(&self, conn: &Connection) -> AttributeValue {
        match self {
            Self::Source => AttributeValue::Id(conn.source.raw()),
            Self::Target => AttributeValue::Id(conn.target.raw()),
            Self::Weight => AttributeValue::Float(conn.weight),
            Self::Delay => AttributeValue::Float(conn.delay),
            Self::Receptor => AttributeValue::Int(conn.receptor),
            Self::SynapseModel => AttributeValue::Model(conn.synapse_model),
            Self::Sequence => AttributeValue::Id(conn.sequence),
        }
    }

    fn empty_column(&self, capacity: usize) -> AttributeColumn {
        match self {
            Self::Source | Self::Target | Self::Sequence => {
                AttributeColumn::Ids(Vec::with_capacity(capacity))
            }
            Self::Weight | Self::Delay => AttributeColumn::Floats(Vec::with_capacity(capacity)),
            Self::Receptor => AttributeColumn::Ints(Vec::with_capacity(capacity)),
            Self::SynapseModel => AttributeColumn::Models(Vec::with_capacity(capacity)),
        }
    }

    fn gather(&self, store: &ConnectionStore, edges: &[EdgeRef]) -> AttributeColumn {
        let conns = || edges.par_iter().map(|&e| store.get(e));
        match self {
            Self::Source => AttributeColumn::Ids(conns().map(|c| c.source.raw()).collect()),
            Self::Target => AttributeColumn::Ids(conns().map(|c| c.target.raw()).collect()),
            Self::Sequence => AttributeColumn::Ids(conns().map(|c| c.sequence).collect()),
            Self::Weight => AttributeColumn::Floats(conns().map(|c| c.weight).collect()),
            Self::Delay => AttributeColumn::Floats(conns().map(|c| c.delay).collect()),
            Self::Receptor => AttributeColumn::Ints(conns().map(|c| c.receptor).collect()),
            Self::SynapseModel => AttributeColumn::Models(conns().map(|c| c.synapse_model).collect()),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| KernelError::unknown_attribute(s))
    }
}

/// Retrieval path used by [`crate::Kernel::get`].
///
/// Both paths return identical values in identical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ExtractionStrategy {
    /// Row-wise walk materialising each connection record
    #[default]
    Standard,
    /// Column-wise parallel gather straight from the shards
    Custom,
}

impl ExtractionStrategy {
    /// Strategy selected by the `custom` flag
    pub fn from_custom_flag(custom: bool) -> Self {
        if custom {
            Self::Custom
        } else {
            Self::Standard
        }
    }

    /// Whether this is the custom path
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom)
    }
}

#[derive(Debug, Clone, Copy)]
enum AttributeValue {
    Id(u64),
    Float(f64),
    Int(i64),
    Model(SynapseModel),
}

/// One extracted attribute, one value per connection
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeColumn {
    /// Node ids and sequence numbers
    Ids(Vec<u64>),
    /// Weights and delays
    Floats(Vec<f64>),
    /// Receptor ports
    Ints(Vec<i64>),
    /// Synapse models
    Models(Vec<SynapseModel>),
}

impl AttributeColumn {
    /// Number of values
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(v) => v.len(),
            Self::Floats(v) => v.len(),
            Self::Ints(v) => v.len(),
            Self::Models(v) => v.len(),
        }
    }

    /// True when the column holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Id values, if this is an id column
    pub fn as_ids(&self) -> Option<&[u64]> {
        match self {
            Self::Ids(v) => Some(v),
            _ => None,
        }
    }

    /// Float values, if this is a float column
    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Self::Floats(v) => Some(v),
            _ => None,
        }
    }

    /// Integer values, if this is an integer column
    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Self::Ints(v) => Some(v),
            _ => None,
        }
    }

    fn push(&mut self, value: AttributeValue) {
        match (self, value) {
            (Self::Ids(v), AttributeValue::Id(x)) => v.push(x),
            (Self::Floats(v), AttributeValue::Float(x)) => v.push(x),
            (Self::Ints(v), AttributeValue::Int(x)) => v.push(x),
            (Self::Models(v), AttributeValue::Model(x)) => v.push(x),
            // Attribute::empty_column and Attribute::value agree on kinds
            _ => unreachable!("attribute column kind mismatch"),
        }
    }
}

/// Mapping from attribute to its column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionAttributes {
    columns: BTreeMap<Attribute, AttributeColumn>,
}

impl ConnectionAttributes {
    /// Column for `attr`, if it was requested
    pub fn get(&self, attr: Attribute) -> Option<&AttributeColumn> {
        self.columns.get(&attr)
    }

    /// Source ids, if requested
    pub fn sources(&self) -> Option<&[u64]> {
        self.get(Attribute::Source).and_then(AttributeColumn::as_ids)
    }

    /// Target ids, if requested
    pub fn targets(&self) -> Option<&[u64]> {
        self.get(Attribute::Target).and_then(AttributeColumn::as_ids)
    }

    /// Weights, if requested
    pub fn weights(&self) -> Option<&[f64]> {
        self.get(Attribute::Weight).and_then(AttributeColumn::as_floats)
    }

    /// Delays, if requested
    pub fn delays(&self) -> Option<&[f64]> {
        self.get(Attribute::Delay).and_then(AttributeColumn::as_floats)
    }

    /// Extracted attributes
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.columns.keys().copied()
    }

    /// Iterate (attribute, column) pairs
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &AttributeColumn)> {
        self.columns.iter().map(|(a, c)| (*a, c))
    }

    /// Number of extracted columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(Attribute, AttributeColumn)> for ConnectionAttributes {
    fn from_iter<I: IntoIterator<Item = (Attribute, AttributeColumn)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Result of a connection query: positions in canonical order
#[derive(Debug, Clone, Default)]
pub struct ConnectionSet {
    edges: Vec<EdgeRef>,
}

impl ConnectionSet {
    /// Number of connections in the set
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True when the query matched nothing
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Scan `store` for connections passing `filter`.
    ///
    /// Shards are scanned in parallel; the result is sorted by
    /// (source, target, sequence) so it does not depend on the shard count.
    pub(crate) fn select(store: &ConnectionStore, filter: &ConnectionFilter) -> Self {
        let mut hits: Vec<((u64, u64, u64), EdgeRef)> = store
            .shards()
            .par_iter()
            .enumerate()
            .flat_map_iter(|(shard, conns)| {
                conns
                    .iter()
                    .enumerate()
                    .filter(|(_, conn)| filter.matches(conn))
                    .map(move |(offset, conn)| {
                        (
                            (conn.source.raw(), conn.target.raw(), conn.sequence),
                            EdgeRef::new(shard, offset),
                        )
                    })
            })
            .collect();
        hits.par_sort_unstable_by_key(|(key, _)| *key);

        Self {
            edges: hits.into_iter().map(|(_, edge)| edge).collect(),
        }
    }

    /// Pull `attrs` (all attributes when empty) out of `store`
    pub(crate) fn extract(
        &self,
        store: &ConnectionStore,
        attrs: &[Attribute],
        strategy: ExtractionStrategy,
    ) -> ConnectionAttributes {
        let attrs: &[Attribute] = if attrs.is_empty() { &Attribute::ALL } else { attrs };
        match strategy {
            ExtractionStrategy::Standard => self.extract_rows(store, attrs),
            ExtractionStrategy::Custom => self.extract_columns(store, attrs),
        }
    }

    fn extract_rows(&self, store: &ConnectionStore, attrs: &[Attribute]) -> ConnectionAttributes {
        let mut columns: BTreeMap<Attribute, AttributeColumn> = attrs
            .iter()
            .map(|a| (*a, a.empty_column(self.edges.len())))
            .collect();

        for &edge in &self.edges {
            let record = store.get(edge).clone();
            for (attr, column) in columns.iter_mut() {
                column.push(attr.value(&record));
            }
        }
        ConnectionAttributes { columns }
    }

    fn extract_columns(&self, store: &ConnectionStore, attrs: &[Attribute]) -> ConnectionAttributes {
        let columns = attrs
            .iter()
            .map(|a| (*a, a.gather(store, &self.edges)))
            .collect();
        ConnectionAttributes { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connection::SynapseSpec, NodeId};

    fn chain_store(shards: usize) -> ConnectionStore {
        let mut store = ConnectionStore::new(shards);
        // inserted back-to-front so storage order differs from canonical order
        for i in (0..20u64).rev() {
            let spec = SynapseSpec::new(if i % 2 == 0 { SynapseModel::Stdp } else { SynapseModel::Static })
                .with_weight(i as f64 / 10.0)
                .with_delay(1.0 + i as f64);
            store.insert(&[(NodeId::new(i + 1), NodeId::new(i + 6))], &spec);
        }
        store
    }

    #[test]
    fn test_attribute_names() {
        for attr in Attribute::ALL {
            assert_eq!(attr.name().parse::<Attribute>().unwrap(), attr);
        }
        assert!(matches!(
            "port".parse::<Attribute>(),
            Err(KernelError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_select_is_canonically_ordered() {
        let store = chain_store(3);
        let set = ConnectionSet::select(&store, &ConnectionFilter::all());
        let attrs = set.extract(&store, &[Attribute::Source], ExtractionStrategy::Standard);
        assert_eq!(attrs.sources().unwrap(), (1..=20).collect::<Vec<u64>>().as_slice());
    }

    #[test]
    fn test_filters() {
        let store = chain_store(2);
        let sources = NodeCollection::new(NodeId::new(1), 5);
        let set = ConnectionSet::select(&store, &ConnectionFilter::all().with_sources(sources));
        assert_eq!(set.len(), 5);

        let set = ConnectionSet::select(
            &store,
            &ConnectionFilter::all().with_synapse_model(SynapseModel::Stdp),
        );
        assert_eq!(set.len(), 10);

        let set = ConnectionSet::select(&store, &ConnectionFilter::all().with_weight_range(0.5, 1.0));
        assert_eq!(set.len(), 6);

        let set = ConnectionSet::select(&store, &ConnectionFilter::all().with_delay_range(0.0, 2.5));
        assert_eq!(set.len(), 2);

        let targets = NodeCollection::new(NodeId::new(100), 5);
        assert!(ConnectionSet::select(&store, &ConnectionFilter::all().with_targets(targets)).is_empty());
    }

    #[test]
    fn test_strategies_agree() {
        let store = chain_store(4);
        let set = ConnectionSet::select(&store, &ConnectionFilter::all());
        let standard = set.extract(&store, &[], ExtractionStrategy::Standard);
        let custom = set.extract(&store, &[], ExtractionStrategy::Custom);
        assert_eq!(standard, custom);
        assert_eq!(standard.len(), Attribute::ALL.len());
        assert_eq!(standard.weights().unwrap().len(), 20);
    }

    #[test]
    fn test_requested_subset_only() {
        let store = chain_store(1);
        let set = ConnectionSet::select(&store, &ConnectionFilter::all());
        let attrs = set.extract(&store, &[Attribute::Target, Attribute::Delay], ExtractionStrategy::Custom);
        assert_eq!(attrs.attributes().collect::<Vec<_>>(), vec![Attribute::Target, Attribute::Delay]);
        assert!(attrs.sources().is_none());
        assert_eq!(attrs.delays().unwrap()[0], 1.0);
    }

    #[test]
    fn test_strategy_flag() {
        assert_eq!(ExtractionStrategy::from_custom_flag(true), ExtractionStrategy::Custom);
        assert!(!ExtractionStrategy::from_custom_flag(false).is_custom());
    }
}
