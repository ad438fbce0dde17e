use serde_derive::{ Deserialize, Serialize };

use crate::{demand::generator::DistributionTable, np_core::parameters::DEFAULT_TRAFFIC_PER_DEMAND_GBPS};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TrafficConfig {
    /// Demand list (TOML). Empty means "synthesize".
    pub demand_filepath: String,
    pub number_of_demands_to_synthesize: usize,
    /// Share of synthesized demands starting at a CORE node, 0-100
    pub percentage_of_core_originated_traffic: f64,
    pub traffic_per_demand_gbps: f64,
    /// Overrides the built-in destination/QoS table
    pub distribution: Option<DistributionTable>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            demand_filepath: String::new(),
            number_of_demands_to_synthesize: 350,
            percentage_of_core_originated_traffic: 50.0,
            traffic_per_demand_gbps: DEFAULT_TRAFFIC_PER_DEMAND_GBPS,
            distribution: None,
        }
    }
}
