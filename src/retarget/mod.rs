//! 骨骼动作重定向模块
//!
//! 把源骨骼（动捕骨骼）每帧的关节朝向转移到结构不同的目标骨骼上，
//! 目标骨骼保留自己的骨长与绑定姿态。
//!
//! ## 每帧流程
//!
//! 1. 采样器写入源骨骼局部变换，并更新源骨骼世界矩阵
//! 2. 按目标骨骼父骨骼优先顺序遍历
//! 3. 通过名称映射找到对应的源骨骼，没有则跳过
//! 4. 转移世界空间旋转并分解回目标局部变换
//! 5. 处理髋部平移策略
//!
//! ## 使用示例
//!
//! ```rust
//! use retarget_engine::animation::{Bone, Skeleton};
//! use retarget_engine::retarget::{retarget, BoneNameMap, RetargetOptions};
//! use glam::Quat;
//!
//! let mut source = Skeleton::new(vec![Bone::new("hip", None)]).unwrap();
//! let mut target = Skeleton::new(vec![Bone::new("mixamorig:Hips", None)]).unwrap();
//! let options = RetargetOptions::new()
//!     .with_names(BoneNameMap::new().with("mixamorig:Hips", "hip"));
//!
//! source.set_local_rotation(0, Quat::from_rotation_y(1.0)).unwrap();
//! source.update_world_matrices();
//!
//! let stats = retarget(&mut target, &source, &options).unwrap();
//! assert_eq!(stats.retargeted, 1);
//! ```

pub mod bone_map;
pub mod options;
pub mod plan;
pub mod pose_policy;
pub mod retargeter;
pub mod service;
pub mod system;

#[cfg(test)]
mod property_tests;

pub use bone_map::{resolve, BoneNameMap, SourceIndex};
pub use options::{RetargetOptions, DEFAULT_HIP};
pub use plan::{BoneBinding, RetargetPlan};
pub use pose_policy::{apply_correction, apply_root_policy, compose_world_rotation, RootMotion};
pub use retargeter::{retarget_bone, source_rotation};
pub use service::{retarget, RetargetService, RetargetStats};
pub use system::{retarget_system, skeleton_update_system, RetargetTarget};
