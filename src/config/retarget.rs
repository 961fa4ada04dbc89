//! 重定向配置

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::retarget::{BoneNameMap, RetargetOptions, DEFAULT_HIP};

/// 轴角形式的旋转，便于在配置文件中书写
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// 旋转轴（无需归一化）
    pub axis: [f32; 3],
    /// 旋转角度（度）
    pub degrees: f32,
}

impl RotationConfig {
    /// 绕竖直轴旋转 180°
    pub fn half_turn_y() -> Self {
        Self {
            axis: [0.0, 1.0, 0.0],
            degrees: 180.0,
        }
    }

    /// 转换为四元数
    pub fn to_quat(&self) -> ConfigResult<Quat> {
        let axis = Vec3::from(self.axis);
        if !axis.is_finite() || axis.length_squared() < 1e-12 {
            return Err(ConfigError::ValidationError(format!(
                "Invalid rotation axis {:?}",
                self.axis
            )));
        }
        if !self.degrees.is_finite() {
            return Err(ConfigError::ValidationError(
                "Rotation angle must be finite".to_string(),
            ));
        }
        Ok(Quat::from_axis_angle(axis.normalize(), self.degrees.to_radians()))
    }
}

/// 重定向行为配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetSettings {
    /// 髋部保持目标绑定姿态的平移
    pub preserve_root_position: bool,

    /// 使用源骨骼世界矩阵（否则相对源骨骼根骨骼）
    pub use_target_world_matrix: bool,

    /// 髋部规范名
    pub hip: String,

    /// 模型级坐标系修正
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_correction: Option<RotationConfig>,

    /// 规范名 → 绑定修正
    pub bind_offsets: BTreeMap<String, RotationConfig>,
}

impl_default!(RetargetSettings {
    preserve_root_position: false,
    use_target_world_matrix: true,
    hip: DEFAULT_HIP.to_string(),
    coordinate_correction: None,
    bind_offsets: BTreeMap::new(),
});

impl RetargetSettings {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.hip.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Hip bone name must not be empty".to_string(),
            ));
        }
        if let Some(correction) = &self.coordinate_correction {
            correction.to_quat()?;
        }
        for offset in self.bind_offsets.values() {
            offset.to_quat()?;
        }
        Ok(())
    }

    /// 构建不可变的重定向选项
    pub fn to_options(
        &self,
        names: BoneNameMap,
        source_names: Option<BoneNameMap>,
    ) -> ConfigResult<RetargetOptions> {
        let mut options = RetargetOptions::new()
            .with_names(names)
            .with_hip(self.hip.trim())
            .with_preserve_root_position(self.preserve_root_position)
            .with_target_world_matrix(self.use_target_world_matrix);
        if let Some(names) = source_names {
            options = options.with_source_names(names);
        }
        if let Some(correction) = &self.coordinate_correction {
            options = options.with_coordinate_correction(correction.to_quat()?);
        }
        for (name, offset) in &self.bind_offsets {
            options = options.with_bind_offset(name.clone(), offset.to_quat()?);
        }
        options
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Ok(options)
    }
}
