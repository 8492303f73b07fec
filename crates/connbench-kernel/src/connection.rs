//! Connection records, synapse specifications and connection rules

use crate::{error::*, models::SynapseModel, nodes::NodeCollection, NodeId};
use rand::{seq::index::sample, Rng};

/// Synapse parameters applied to every edge created by one connect call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SynapseSpec {
    /// Synapse model
    pub synapse_model: SynapseModel,
    /// Synaptic weight
    pub weight: f64,
    /// Transmission delay (ms)
    pub delay: f64,
    /// Receptor port on the target
    pub receptor_type: i64,
}

impl Default for SynapseSpec {
    fn default() -> Self {
        Self {
            synapse_model: SynapseModel::Static,
            weight: 1.0,
            delay: 1.0,
            receptor_type: 0,
        }
    }
}

impl SynapseSpec {
    /// Spec for `model` with default weight, delay and receptor
    pub fn new(synapse_model: SynapseModel) -> Self {
        Self {
            synapse_model,
            ..Default::default()
        }
    }

    /// Set the weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the delay (ms)
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Set the receptor port
    pub fn with_receptor(mut self, receptor_type: i64) -> Self {
        self.receptor_type = receptor_type;
        self
    }

    /// Validate weight and delay against the kernel resolution
    pub fn validate(&self, resolution: f64) -> Result<()> {
        if !self.weight.is_finite() {
            return Err(KernelError::invalid_parameter(
                "weight",
                self.weight.to_string(),
                "finite",
            ));
        }
        if !self.delay.is_finite() || self.delay < resolution {
            return Err(KernelError::invalid_parameter(
                "delay",
                self.delay.to_string(),
                format!(">= resolution ({})", resolution),
            ));
        }
        Ok(())
    }
}

/// Connection rule
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "rule", rename_all = "snake_case"))]
pub enum ConnectionRule {
    /// Every source to every target
    AllToAll {
        /// Permit source == target
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        allow_autapses: bool,
    },
    /// i-th source to i-th target; sizes must match
    OneToOne,
    /// Each target draws `indegree` sources at random (without replacement)
    FixedIndegree {
        /// Sources per target
        indegree: usize,
        /// Permit source == target
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        allow_autapses: bool,
    },
    /// Each (source, target) pair is connected with probability `p`
    PairwiseBernoulli {
        /// Connection probability
        p: f64,
        /// Permit source == target
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        allow_autapses: bool,
    },
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl Default for ConnectionRule {
    fn default() -> Self {
        Self::all_to_all()
    }
}

impl ConnectionRule {
    /// All-to-all with autapses allowed
    pub fn all_to_all() -> Self {
        Self::AllToAll { allow_autapses: true }
    }

    /// Registered rule name
    pub fn name(&self) -> &'static str {
        match self {
            Self::AllToAll { .. } => "all_to_all",
            Self::OneToOne => "one_to_one",
            Self::FixedIndegree { .. } => "fixed_indegree",
            Self::PairwiseBernoulli { .. } => "pairwise_bernoulli",
        }
    }

    /// Expand the rule into (source, target) pairs.
    ///
    /// Pairs are produced target-major for the random rules and source-major
    /// otherwise; the order is deterministic for a given RNG state.
    pub(crate) fn expand<R: Rng>(
        &self,
        pre: &NodeCollection,
        post: &NodeCollection,
        rng: &mut R,
    ) -> Result<Vec<(NodeId, NodeId)>> {
        match *self {
            Self::AllToAll { allow_autapses } => {
                let mut pairs = Vec::with_capacity(pre.len() * post.len());
                for s in pre.iter() {
                    for t in post.iter() {
                        if allow_autapses || s != t {
                            pairs.push((s, t));
                        }
                    }
                }
                Ok(pairs)
            }
            Self::OneToOne => {
                if pre.len() != post.len() {
                    return Err(KernelError::network_topology(format!(
                        "one_to_one requires equal sizes, got {} sources and {} targets",
                        pre.len(),
                        post.len()
                    )));
                }
                Ok(pre.iter().zip(post.iter()).collect())
            }
            Self::FixedIndegree { indegree, allow_autapses } => {
                if indegree > pre.len() {
                    return Err(KernelError::network_topology(format!(
                        "fixed_indegree of {} exceeds {} sources",
                        indegree,
                        pre.len()
                    )));
                }
                let capacity = indegree.checked_mul(post.len()).ok_or_else(|| {
                    KernelError::network_topology("fixed_indegree edge count overflows")
                })?;
                let mut pairs = Vec::with_capacity(capacity);
                for t in post.iter() {
                    let candidates: Vec<NodeId> = pre
                        .iter()
                        .filter(|&s| allow_autapses || s != t)
                        .collect();
                    if indegree > candidates.len() {
                        return Err(KernelError::network_topology(format!(
                            "fixed_indegree of {} exceeds {} available sources for target {}",
                            indegree,
                            candidates.len(),
                            t
                        )));
                    }
                    for i in sample(rng, candidates.len(), indegree).into_iter() {
                        pairs.push((candidates[i], t));
                    }
                }
                Ok(pairs)
            }
            Self::PairwiseBernoulli { p, allow_autapses } => {
                if !(0.0..=1.0).contains(&p) {
                    return Err(KernelError::invalid_parameter(
                        "p",
                        p.to_string(),
                        "0.0 <= p <= 1.0",
                    ));
                }
                let mut pairs = Vec::new();
                for t in post.iter() {
                    for s in pre.iter() {
                        if (allow_autapses || s != t) && rng.gen::<f64>() < p {
                            pairs.push((s, t));
                        }
                    }
                }
                Ok(pairs)
            }
        }
    }
}

/// Stored connection
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Presynaptic node
    pub source: NodeId,
    /// Postsynaptic node
    pub target: NodeId,
    /// Synapse model
    pub synapse_model: SynapseModel,
    /// Synaptic weight
    pub weight: f64,
    /// Transmission delay (ms)
    pub delay: f64,
    /// Receptor port on the target
    pub receptor: i64,
    /// Kernel-wide creation sequence number
    pub sequence: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn nodes(first: u64, len: usize) -> NodeCollection {
        NodeCollection::new(NodeId::new(first), len)
    }

    #[test]
    fn test_synapse_spec_validation() {
        let spec = SynapseSpec::new(SynapseModel::Stdp).with_delay(1.0).with_weight(0.5);
        assert!(spec.validate(0.1).is_ok());
        assert!(spec.clone().with_delay(0.05).validate(0.1).is_err());
        assert!(spec.with_weight(f64::INFINITY).validate(0.1).is_err());
    }

    #[test]
    fn test_all_to_all() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = nodes(1, 3);
        let pairs = ConnectionRule::all_to_all().expand(&n, &n, &mut rng).unwrap();
        assert_eq!(pairs.len(), 9);

        let no_autapses = ConnectionRule::AllToAll { allow_autapses: false };
        assert_eq!(no_autapses.expand(&n, &n, &mut rng).unwrap().len(), 6);
    }

    #[test]
    fn test_one_to_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let pairs = ConnectionRule::OneToOne
            .expand(&nodes(1, 3), &nodes(11, 3), &mut rng)
            .unwrap();
        assert_eq!(pairs[2], (NodeId::new(3), NodeId::new(13)));
        assert!(ConnectionRule::OneToOne
            .expand(&nodes(1, 3), &nodes(11, 4), &mut rng)
            .is_err());
    }

    #[test]
    fn test_fixed_indegree() {
        let mut rng = StdRng::seed_from_u64(7);
        let rule = ConnectionRule::FixedIndegree { indegree: 3, allow_autapses: false };
        let n = nodes(1, 10);
        let pairs = rule.expand(&n, &n, &mut rng).unwrap();
        assert_eq!(pairs.len(), 30);
        assert!(pairs.iter().all(|(s, t)| s != t));

        let too_many = ConnectionRule::FixedIndegree { indegree: 11, allow_autapses: true };
        assert!(too_many.expand(&n, &n, &mut rng).is_err());
    }

    #[test]
    fn test_fixed_indegree_oversized_is_an_error() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = nodes(1, 3);
        let huge = ConnectionRule::FixedIndegree { indegree: usize::MAX / 2, allow_autapses: true };
        assert!(matches!(
            huge.expand(&n, &n, &mut rng),
            Err(KernelError::NetworkTopology { .. })
        ));
    }

    #[test]
    fn test_pairwise_bernoulli_is_seeded() {
        let rule = ConnectionRule::PairwiseBernoulli { p: 0.3, allow_autapses: true };
        let n = nodes(1, 20);
        let a = rule.expand(&n, &n, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = rule.expand(&n, &n, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);

        let bad = ConnectionRule::PairwiseBernoulli { p: 1.5, allow_autapses: true };
        assert!(bad.expand(&n, &n, &mut StdRng::seed_from_u64(99)).is_err());
    }
}
