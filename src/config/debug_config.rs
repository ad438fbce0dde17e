use serde_derive::{ Deserialize, Serialize };

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
/// デバッガ関連の設定
pub struct DebugConfig {
    /// パス需要の割当を出力するか
    pub log_demand_assign: bool,
    /// 光パスの新設を出力するか
    pub log_lightpath_create: bool,
    /// Best-effort需要の破棄を出力するか
    pub log_demand_drop: bool,
    /// 終了時にstate_matrixを出力するか
    pub log_state_matrix: bool,
    /// プログレスバーを表示するか
    pub show_progress: bool,
}
