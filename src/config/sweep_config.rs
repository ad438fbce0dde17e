use serde_derive::{ Deserialize, Serialize };

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
/// 需要数を増やしながら繰り返す反復実験の設定
pub struct SweepConfig {
    /// 反復実験を行うか
    pub enabled: bool,
    /// 最初の需要数
    pub start_demands: usize,
    /// ステップごとの需要数の増分
    pub increment_demands: usize,
    /// 一つの需要数あたりの試行回数
    pub iterations_per_step: usize,
    /// 0 means "until every iteration of a step fails"
    pub max_steps: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_demands: 50,
            increment_demands: 50,
            iterations_per_step: 10,
            max_steps: 0,
        }
    }
}
