use rand_chacha::ChaCha8Rng;
use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::{
    config::Config,
    error::{Error, Result},
    network::LightpathID,
    topology::Topology,
    utils, SD,
};

pub mod generator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Deserialize, Serialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QosClass {
    Priority,
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DemandStatus {
    Pending,
    Served,
    Dropped,
}

#[derive(Debug, Clone)]
pub struct Demand {
    pub index: usize,
    pub sd: SD,
    /// Gbps
    pub traffic_gbps: f64,
    pub qos: QosClass,
    pub status: DemandStatus,
    /// Lightpaths carrying the demand, source to destination
    pub ip_path: Vec<LightpathID>,
}

impl Demand {
    pub fn new(index: usize, sd: SD, traffic_gbps: f64, qos: QosClass) -> Self {
        Self {
            index,
            sd,
            traffic_gbps,
            qos,
            status: DemandStatus::Pending,
            ip_path: vec![],
        }
    }

    pub fn is_priority(&self) -> bool {
        self.qos == QosClass::Priority
    }
}

#[derive(Debug, Deserialize)]
struct DemandFile {
    #[serde(default, rename = "demand")]
    demands: Vec<DemandEntry>,
}

#[derive(Debug, Deserialize)]
struct DemandEntry {
    src: usize,
    dst: usize,
    traffic_gbps: Option<f64>,
    qos: QosClass,
}

/// Demand set of a run: read from `traffic.demand_filepath`, or synthesized when it is empty.
pub fn get_demand_list(config: &Config, topology: &Topology, rng: &mut ChaCha8Rng) -> Result<Vec<Demand>> {
    let demand_list = match config.traffic.demand_filepath.as_str() {
        "" => {
            let generator = generator::TrafficGenerator::from_config(config, topology)?;
            generator.generate(rng, config.traffic.number_of_demands_to_synthesize)?
        }
        filepath => {
            let contents = utils::read_file(filepath)?;
            demands_from_toml_str(&contents, config.traffic.traffic_per_demand_gbps)?
        }
    };

    validate_demands(&demand_list, topology)?;
    Ok(demand_list)
}

/// Parses `[[demand]]` tables; a missing `traffic_gbps` falls back to `default_traffic`.
pub fn demands_from_toml_str(contents: &str, default_traffic: f64) -> Result<Vec<Demand>> {
    let file: DemandFile = toml::from_str(contents)?;

    Ok(file
        .demands
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            Demand::new(
                index,
                SD::new(entry.src, entry.dst),
                entry.traffic_gbps.unwrap_or(default_traffic),
                entry.qos,
            )
        })
        .collect())
}

pub fn validate_demands(demand_list: &[Demand], topology: &Topology) -> Result<()> {
    if demand_list.is_empty() {
        return Err(Error::EmptyDemandSet);
    }

    for demand in demand_list {
        for node in [demand.sd.src, demand.sd.dst] {
            if !topology.contains_node(node) {
                return Err(Error::UnknownNode(node.index()));
            }
        }
        if demand.sd.src == demand.sd.dst {
            return Err(Error::InvalidDemand { index: demand.index, reason: "source equals destination".to_string() });
        }
        if demand.traffic_gbps <= 0.0 {
            return Err(Error::InvalidDemand { index: demand.index, reason: format!("offered traffic {} Gbps", demand.traffic_gbps) });
        }
    }

    Ok(())
}
