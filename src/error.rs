use thiserror::Error;

use crate::{Edge, Node};

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Topology has no nodes")]
    EmptyTopology,

    #[error("Topology has no links")]
    NoLinks,

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Node {0} does not exist in the topology")]
    UnknownNode(usize),

    #[error("Link {0} does not exist in the topology")]
    UnknownLink(Edge),

    #[error("Invalid transponder catalog: {0}")]
    InvalidCatalog(String),

    #[error("Transponder type `{0}` is not in the catalog")]
    UnknownTransponder(String),

    #[error("Demand set is empty")]
    EmptyDemandSet,

    #[error("Invalid demand #{index}: {reason}")]
    InvalidDemand { index: usize, reason: String },

    #[error("No feasible route for PRIORITY demand #{index} from node {src} to node {dst}")]
    PriorityDemandInfeasible { index: usize, src: Node, dst: Node },

    #[error("Best-effort drop ratio {dropped}/{total} ({ratio:.4}) exceeds the limit {limit}")]
    DropThresholdExceeded {
        dropped: usize,
        total: usize,
        ratio: f64,
        limit: f64,
    },

    #[error("Internal fault: no modulation of `{transponder}` reaches {length_km} km after splitting")]
    ModulationUnreachable { transponder: String, length_km: f64 },

    #[error("Internal fault: slot {slot} on fiber {edge} is already occupied")]
    SlotClash { edge: Edge, slot: usize },

    #[error("Internal fault: fiber {edge} does not record lightpath #{lightpath} crossing it")]
    OwnerMismatch { edge: Edge, lightpath: usize },

    #[error("Internal fault: lightpath #{0} selected for reuse cannot carry the demand anymore")]
    StaleReuse(usize),

    #[error("Traffic generation failed: no candidate node for {0}")]
    EmptyCandidatePool(String),

    #[error("Traffic generation failed: {0}")]
    InvalidDistribution(String),
}

impl Error {
    /// The run ended because the demand set does not fit, not because of bad input or a fault.
    pub fn is_capacity_exhausted(&self) -> bool {
        matches!(self, Error::PriorityDemandInfeasible { .. } | Error::DropThresholdExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
