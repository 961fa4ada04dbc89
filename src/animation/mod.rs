//! 骨骼模型模块
//!
//! 提供骨骼层级、局部/世界变换与父骨骼优先的遍历调度。
//!
//! ## 使用示例
//!
//! ```rust
//! use retarget_engine::animation::{Bone, BoneTransform, Skeleton};
//! use glam::{Quat, Vec3};
//!
//! let mut skeleton = Skeleton::new(vec![
//!     Bone::new("hip", None),
//!     Bone::new("head", Some(0)).with_transform(BoneTransform::from_translation(Vec3::Y)),
//! ])
//! .unwrap();
//!
//! // 修改局部变换后世界矩阵失效，需要按遍历顺序重新计算
//! skeleton.set_local_rotation(0, Quat::from_rotation_x(0.5)).unwrap();
//! skeleton.update_world_matrices();
//! assert!(skeleton.first_stale_bone().is_none());
//! ```

pub mod skeleton;
pub mod traversal;

pub use skeleton::{Bone, BoneTransform, Skeleton, SkeletonPose};
pub use traversal::{traversal_order, TraversalOrder};
