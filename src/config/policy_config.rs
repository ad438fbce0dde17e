use serde_derive::{ Deserialize, Serialize };

use crate::{np_core::parameters::DEFAULT_DROP_RATIO_LIMIT, transponder::ModulationObjective};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
/// ルーティングポリシー関連の設定
pub struct PolicyConfig {
    /// Demand scheduling policy (greedy)
    pub scheduling_policy: String,
    pub modulation_objective: ModulationObjective,
    /// Serve every segment with one transponder type regardless of region
    pub single_transponder_mode_enabled: bool,
    pub single_transponder_type: String,
    /// Largest tolerated share of dropped best-effort demands
    pub drop_ratio_limit: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            scheduling_policy: "greedy".to_string(),
            modulation_objective: ModulationObjective::HighestSpectralEfficiency,
            single_transponder_mode_enabled: false,
            single_transponder_type: String::new(),
            drop_ratio_limit: DEFAULT_DROP_RATIO_LIMIT,
        }
    }
}
