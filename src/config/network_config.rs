use serde_derive::{ Deserialize, Serialize };

use crate::np_core::parameters::{DEFAULT_K, DEFAULT_SLOTS_PER_FIBER};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
/// ネットワーク関連の設定
pub struct NetworkConfig {
    /// 対象物理トポロジ (TOML file)
    pub topology: String,
    /// Frequency slots on every fiber
    pub slots_per_fiber: usize,
    /// Maximum number of candidate paths per node pair
    pub k: usize,
    /// Non-positive means no limit
    pub max_propagation_delay_ms: f64,
    /// Non-positive means no limit
    pub max_route_length_km: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            topology: String::new(),
            slots_per_fiber: DEFAULT_SLOTS_PER_FIBER,
            k: DEFAULT_K,
            max_propagation_delay_ms: -1.0,
            max_route_length_km: -1.0,
        }
    }
}
