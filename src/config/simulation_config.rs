use serde_derive::{ Deserialize, Serialize };

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
/// シミュレーション関連の設定
pub struct SimulationConfig {
    /// ランダムシード
    pub random_seed: u64,
    /// 統計情報出力先フォルダ
    pub outdir: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            random_seed: 0,
            outdir: "results".to_string(),
        }
    }
}
