//! 引擎配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock};

/// 引擎配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // ========== 回归模型 ==========
    /// 关节数量，默认 24（SMPL 标准骨架）
    pub joint_count: usize,
    /// 形状参数数量，默认 10
    pub beta_count: usize,
    /// FBX 混合形状对应的标准差数，默认 5
    /// 混合形状权重 = |beta| * 100 / 此值
    pub standard_deviations_fbx: f32,

    // ========== 骨骼 ==========
    /// 根骨骼名称（去前缀后），此骨骼不参与重定位
    pub root_bone_name: String,
    /// 盆骨骨骼名称（去前缀后），落地时平移此骨骼
    pub pelvis_bone_name: String,
    /// 重定位后是否默认落地
    pub feet_on_ground: bool,

    // ========== 报表 ==========
    /// CSV 列分隔符
    pub csv_separator: String,
    /// 距离单位换算（米 → 厘米）
    pub distance_scale: f32,
    /// TXT 报表中最长网格名称的默认字符数
    pub text_mesh_name_width: usize,

    // ========== 调试 ==========
    /// 是否输出调试日志，默认 false
    pub debug_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // ====== 回归模型 ======
            joint_count: 24,
            beta_count: 10,
            // 导出 FBX 时混合形状按 ±5 个标准差制作
            standard_deviations_fbx: 5.0,

            // ====== 骨骼 ======
            // 骨骼名形如 "m_avg_Pelvis"，前缀由根骨骼 "m_avg_root" 自动推断
            root_bone_name: "root".to_string(),
            pelvis_bone_name: "Pelvis".to_string(),
            feet_on_ground: true,

            // ====== 报表 ======
            csv_separator: ";".to_string(),
            distance_scale: 100.0,
            text_mesh_name_width: 11,

            // ====== 调试 ======
            debug_log: false,
        }
    }
}

/// 全局配置实例
static ENGINE_CONFIG: Lazy<RwLock<EngineConfig>> = Lazy::new(|| {
    RwLock::new(EngineConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> EngineConfig {
    ENGINE_CONFIG.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: EngineConfig) {
    *ENGINE_CONFIG.write().unwrap_or_else(PoisonError::into_inner) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *ENGINE_CONFIG.write().unwrap_or_else(PoisonError::into_inner) = EngineConfig::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.joint_count, 24);
        assert_eq!(config.beta_count, 10);
        assert_eq!(config.csv_separator, ";");
        assert!(config.feet_on_ground);
    }
}
