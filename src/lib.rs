//! # Retarget Engine
//!
//! Hierarchical skeletal motion retargeting: re-poses a target skeleton so that its joints
//! follow the joint orientations of a motion-capture source skeleton, while the target keeps
//! its own bone lengths and bind pose.
//!
//! ## Features
//!
//! - **Skeleton Model**: bone trees with cached world transforms and stale-parent detection
//! - **Traversal Scheduler**: parent-first order derived from the actual bone hierarchy
//! - **Bone Correspondence**: name-based lookup through canonical joint names
//! - **Retarget Core**: orientation-only transfer honoring bind pose and coordinate corrections
//! - **Pose Policy**: hip translation handling (preserve or transfer)
//! - **ECS Integration**: `bevy_ecs` components and systems for per-frame retargeting
//!
//! ## Architecture Design
//!
//! Following the **Anemic Domain Model (贫血模型)** pattern:
//! - **State (Component)**: `Skeleton`, `RetargetTarget`
//! - **Service**: `RetargetService`
//! - **System**: `skeleton_update_system`, `retarget_system`
//!
//! ### Example
//!
//! ```rust
//! use retarget_engine::animation::{Bone, BoneTransform, Skeleton};
//! use retarget_engine::retarget::{retarget, RetargetOptions};
//! use glam::{Quat, Vec3};
//!
//! let mut source = Skeleton::new(vec![
//!     Bone::new("hip", None),
//!     Bone::new("head", Some(0)).with_transform(BoneTransform::from_translation(Vec3::Y)),
//! ])
//! .unwrap();
//! let mut target = Skeleton::new(vec![
//!     Bone::new("hip", None),
//!     Bone::new("head", Some(0)).with_transform(BoneTransform::from_translation(Vec3::Y * 0.5)),
//! ])
//! .unwrap();
//!
//! source.set_local_rotation(1, Quat::from_rotation_x(0.4)).unwrap();
//! source.update_world_matrices();
//! retarget(&mut target, &source, &RetargetOptions::new()).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors, logging and shared macros
//! - [`config`]: Configuration files and environment overrides
//! - [`animation`]: Skeleton model and traversal scheduling
//! - [`retarget`]: Retargeting pipeline

/// Errors, logging and shared macros
pub mod core;
/// Configuration system
pub mod config;
/// Skeleton model and traversal scheduling
pub mod animation;
/// Retargeting pipeline
pub mod retarget;

pub use animation::{Bone, BoneTransform, Skeleton, SkeletonPose};
pub use core::error::{EngineError, EngineResult, RetargetError, SkeletonError};
pub use retarget::{retarget, BoneNameMap, RetargetOptions, RetargetStats};
