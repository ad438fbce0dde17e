use serde_derive::{ Deserialize, Serialize };

use crate::{error::Result, transponder::TransponderConfig, utils};

mod debug_config;
mod network_config;
mod policy_config;
mod simulation_config;
mod sweep_config;
mod traffic_config;

pub use debug_config::DebugConfig;
pub use network_config::NetworkConfig;
pub use policy_config::PolicyConfig;
pub use simulation_config::SimulationConfig;
pub use sweep_config::SweepConfig;
pub use traffic_config::TrafficConfig;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub debug: DebugConfig,
    pub network: NetworkConfig,
    pub policy: PolicyConfig,
    pub traffic: TrafficConfig,
    pub sweep: SweepConfig,
    /// Empty means the built-in catalog
    pub transponders: Vec<TransponderConfig>,
}

impl Config {
    /// Config構造体を作成する
    /// toml形式で書くこと．
    pub fn new(file_name: &str) -> Result<Config> {
        // configファイルを文字列として読込
        let contents = utils::read_file(file_name)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Config> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use crate::transponder::ModulationObjective;

    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            [network]
            topology = "files/topology/metro_core_8.toml"
            slots_per_fiber = 320

            [policy]
            modulation_objective = "lowest_spectrum_occupancy"
            "#,
        )
        .unwrap();

        assert_eq!(config.network.slots_per_fiber, 320);
        assert_eq!(config.network.k, 5);
        assert_eq!(config.policy.modulation_objective, ModulationObjective::LowestSpectrumOccupancy);
        assert_eq!(config.policy.scheduling_policy, "greedy");
        assert_eq!(config.policy.drop_ratio_limit, 0.01);
        assert_eq!(config.traffic.traffic_per_demand_gbps, 100.0);
        assert!(config.transponders.is_empty());
        assert!(!config.sweep.enabled);
    }

    #[test]
    fn broken_toml_is_reported() {
        assert!(Config::from_toml_str("[network\nk = 3").is_err());
    }

    #[test]
    fn default_grid_fits_the_built_in_catalog() {
        let config = Config::default();
        let catalog = crate::transponder::TransponderCatalog::from_config(&config).unwrap();
        let widest = [crate::np_core::Region::Core, crate::np_core::Region::Metro]
            .iter()
            .flat_map(|region| catalog.transponder_for(*region).modulations.iter())
            .map(|m| m.channel_spacing)
            .max()
            .unwrap();

        assert_eq!(config.network.slots_per_fiber, 4950);
        assert!(widest <= config.network.slots_per_fiber);
    }
}
