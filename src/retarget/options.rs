//! 重定向选项
//!
//! 每个（源模型, 目标模型）组合构建一次，之后在各帧之间只读共享。

use std::collections::HashMap;

use glam::Quat;

use crate::core::error::{RetargetError, RetargetResult};

use super::bone_map::BoneNameMap;

/// 默认的髋部规范名
pub const DEFAULT_HIP: &str = "hip";

/// 重定向选项
#[derive(Clone, Debug, PartialEq)]
pub struct RetargetOptions {
    /// 为 true 时髋部保持目标自身绑定姿态的平移，不随源骨骼移动
    pub preserve_root_position: bool,
    /// 为 true 时直接使用源骨骼世界矩阵；否则使用相对该骨骼所在树的根骨骼的矩阵
    pub use_target_world_matrix: bool,
    /// 模型级坐标系修正（例如绕竖直轴 180°），作用于每个被重定向的骨骼
    pub coordinate_correction: Option<Quat>,
    /// 规范名 → 分解前施加的修正旋转
    pub bind_offsets: HashMap<String, Quat>,
    /// 髋部/根骨骼的规范名
    pub hip: String,
    /// 目标骨骼名称映射
    pub names: BoneNameMap,
    /// 源骨骼名称映射（源骨骼未使用规范名时提供）
    pub source_names: Option<BoneNameMap>,
}

impl Default for RetargetOptions {
    fn default() -> Self {
        Self {
            preserve_root_position: false,
            use_target_world_matrix: true,
            coordinate_correction: None,
            bind_offsets: HashMap::new(),
            hip: DEFAULT_HIP.to_string(),
            names: BoneNameMap::new(),
            source_names: None,
        }
    }
}

impl RetargetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names(mut self, names: BoneNameMap) -> Self {
        self.names = names;
        self
    }

    pub fn with_source_names(mut self, names: BoneNameMap) -> Self {
        self.source_names = Some(names);
        self
    }

    pub fn with_hip(mut self, hip: impl Into<String>) -> Self {
        self.hip = hip.into();
        self
    }

    pub fn with_preserve_root_position(mut self, preserve: bool) -> Self {
        self.preserve_root_position = preserve;
        self
    }

    pub fn with_target_world_matrix(mut self, use_world: bool) -> Self {
        self.use_target_world_matrix = use_world;
        self
    }

    pub fn with_coordinate_correction(mut self, correction: Quat) -> Self {
        self.coordinate_correction = Some(correction.normalize());
        self
    }

    pub fn with_bind_offset(mut self, canonical: impl Into<String>, offset: Quat) -> Self {
        self.bind_offsets.insert(canonical.into(), offset.normalize());
        self
    }

    /// 规范名对应的绑定修正
    pub fn bind_offset(&self, canonical: &str) -> Option<Quat> {
        self.bind_offsets.get(canonical).copied()
    }

    /// 验证选项
    pub fn validate(&self) -> RetargetResult<()> {
        if self.hip.is_empty() {
            return Err(RetargetError::InvalidOptions(
                "hip bone name must not be empty".to_string(),
            ));
        }
        if let Some(correction) = self.coordinate_correction {
            if !correction.is_finite() || !correction.is_normalized() {
                return Err(RetargetError::InvalidOptions(format!(
                    "coordinate correction {:?} is not a unit quaternion",
                    correction
                )));
            }
        }
        for (name, offset) in &self.bind_offsets {
            if !offset.is_finite() || !offset.is_normalized() {
                return Err(RetargetError::InvalidOptions(format!(
                    "bind offset for '{}' is not a unit quaternion",
                    name
                )));
            }
        }
        Ok(())
    }
}
