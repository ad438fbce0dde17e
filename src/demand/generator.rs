use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde_derive::{Deserialize, Serialize};
use strum_macros::Display;

use crate::{
    config::Config,
    error::{Error, Result},
    np_core::{dist::{is_distribution, sample_bernoulli, sample_categorical}, Region},
    topology::{NodeInfo, Topology},
    SD,
};

use super::{Demand, QosClass};

/// Where the destination of a synthesized demand is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DestinationBucket {
    /// Same node type, sharing an island with the source
    SameRegion,
    /// Same node type, no island in common
    SameTypeDifferentRegion,
    /// Other node type, no island in common
    DifferentTypeDifferentRegion,
}

impl DestinationBucket {
    const ALL: [DestinationBucket; 3] = [
        DestinationBucket::SameRegion,
        DestinationBucket::SameTypeDifferentRegion,
        DestinationBucket::DifferentTypeDifferentRegion,
    ];
}

/// Distribution for demands leaving one node type.
/// Both arrays are indexed by [`DestinationBucket`] in declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceDistribution {
    pub destination: [f64; 3],
    /// Probability that a demand of the bucket is PRIORITY
    pub priority_share: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DistributionTable {
    pub core: SourceDistribution,
    pub metro: SourceDistribution,
}

impl Default for DistributionTable {
    fn default() -> Self {
        Self {
            core: SourceDistribution {
                destination: [0.4, 0.3, 0.3],
                priority_share: [1.0, 1.0, 1.0],
            },
            metro: SourceDistribution {
                destination: [0.5, 0.2, 0.3],
                priority_share: [0.5, 0.3, 1.0],
            },
        }
    }
}

impl DistributionTable {
    pub fn for_source(&self, region: Region) -> &SourceDistribution {
        match region {
            Region::Core => &self.core,
            Region::Metro => &self.metro,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for region in [Region::Core, Region::Metro] {
            let distribution = self.for_source(region);
            if !is_distribution(&distribution.destination) {
                return Err(Error::InvalidDistribution(format!("{region} destination weights {:?} do not sum to 1", distribution.destination)));
            }
            if distribution.priority_share.iter().any(|p| !(0.0..=1.0).contains(p)) {
                return Err(Error::InvalidDistribution(format!("{region} priority shares {:?} leave [0, 1]", distribution.priority_share)));
            }
        }
        Ok(())
    }
}

/// Synthetic workload drawn from node tags.
pub struct TrafficGenerator<'a> {
    topology: &'a Topology,
    table: DistributionTable,
    p_core: f64,
    traffic_per_demand_gbps: f64,
    core_nodes: Vec<&'a NodeInfo>,
    metro_nodes: Vec<&'a NodeInfo>,
}

impl<'a> TrafficGenerator<'a> {
    pub fn new(topology: &'a Topology, table: DistributionTable, p_core: f64, traffic_per_demand_gbps: f64) -> Result<Self> {
        table.validate()?;
        if !(0.0..=1.0).contains(&p_core) {
            return Err(Error::InvalidConfig(format!("core-originated share {p_core} leaves [0, 1]")));
        }

        let core_nodes: Vec<&NodeInfo> = topology.nodes.iter().filter(|n| n.has_region(Region::Core)).collect();
        // a node carrying both tags is a CORE node
        let metro_nodes: Vec<&NodeInfo> = topology
            .nodes
            .iter()
            .filter(|n| n.has_region(Region::Metro) && !n.has_region(Region::Core))
            .collect();

        Ok(Self {
            topology,
            table,
            p_core,
            traffic_per_demand_gbps,
            core_nodes,
            metro_nodes,
        })
    }

    pub fn from_config(config: &Config, topology: &'a Topology) -> Result<Self> {
        let table = config.traffic.distribution.clone().unwrap_or_default();
        Self::new(
            topology,
            table,
            config.traffic.percentage_of_core_originated_traffic / 100.0,
            config.traffic.traffic_per_demand_gbps,
        )
    }

    fn nodes_of(&self, region: Region) -> &[&'a NodeInfo] {
        match region {
            Region::Core => &self.core_nodes,
            Region::Metro => &self.metro_nodes,
        }
    }

    fn destination_candidates(&self, source: &NodeInfo, source_type: Region, bucket: DestinationBucket) -> Vec<&'a NodeInfo> {
        let other_type = match source_type {
            Region::Core => Region::Metro,
            Region::Metro => Region::Core,
        };

        let (pool, same_island) = match bucket {
            DestinationBucket::SameRegion => (self.nodes_of(source_type), true),
            DestinationBucket::SameTypeDifferentRegion => (self.nodes_of(source_type), false),
            DestinationBucket::DifferentTypeDifferentRegion => (self.nodes_of(other_type), false),
        };

        pool.iter()
            .copied()
            .filter(|n| n.node != source.node && n.shares_island(source) == same_island)
            .collect()
    }

    pub fn generate(&self, rng: &mut ChaCha8Rng, number_of_demands: usize) -> Result<Vec<Demand>> {
        let mut demand_list = Vec::with_capacity(number_of_demands);

        for index in 0..number_of_demands {
            let source_type = if sample_bernoulli(rng, self.p_core) { Region::Core } else { Region::Metro };

            let sources = self.nodes_of(source_type);
            if sources.is_empty() {
                return Err(Error::EmptyCandidatePool(format!("{source_type} sources in {}", self.topology.name)));
            }
            let source = sources[rng.gen_range(0..sources.len())];

            let distribution = self.table.for_source(source_type);
            let bucket_index = sample_categorical(rng, &distribution.destination)
                .ok_or_else(|| Error::InvalidDistribution(format!("{source_type} destination weights")))?;
            let bucket = DestinationBucket::ALL[bucket_index];

            let destinations = self.destination_candidates(source, source_type, bucket);
            if destinations.is_empty() {
                return Err(Error::EmptyCandidatePool(format!("{bucket} destinations of {source_type} node {}", source.node)));
            }
            let destination = destinations[rng.gen_range(0..destinations.len())];

            let qos = if sample_bernoulli(rng, distribution.priority_share[bucket_index]) {
                QosClass::Priority
            } else {
                QosClass::BestEffort
            };

            demand_list.push(Demand::new(
                index,
                SD::new_from_nodes(source.node, destination.node),
                self.traffic_per_demand_gbps,
                qos,
            ));
        }

        Ok(demand_list)
    }
}
