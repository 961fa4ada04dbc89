//! 姿态策略
//!
//! - 世界空间旋转的组合：源旋转 × 绑定旋转 × 绑定修正，再左乘坐标系修正
//! - 髋部平移：保持目标绑定姿态的平移，或直接转移源髋部平移
//!
//! 髋部策略在所有骨骼完成重定向之后每帧执行一次，会再次覆盖髋部平移。

use glam::Quat;

use crate::animation::Skeleton;
use crate::core::error::SkeletonResult;

use super::options::RetargetOptions;

/// 髋部平移的处理结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootMotion {
    /// 保持目标绑定姿态的平移
    Preserved,
    /// 使用源髋部平移
    Transferred,
    /// 没有可用的髋部骨骼
    Skipped,
}

/// 施加坐标系修正
pub fn apply_correction(rotation: Quat, correction: Option<Quat>) -> Quat {
    match correction {
        Some(correction) => (correction * rotation).normalize(),
        None => rotation,
    }
}

/// 组合目标骨骼的世界空间旋转
///
/// `bind` 为目标蒙皮骨骼绑定矩阵（逆绑定矩阵的逆）的旋转部分，
/// `offset` 为该规范名的绑定修正。
pub fn compose_world_rotation(
    source: Quat,
    bind: Option<Quat>,
    offset: Option<Quat>,
    correction: Option<Quat>,
) -> Quat {
    let mut rotation = source;
    if let Some(bind) = bind {
        rotation *= bind;
    }
    if let Some(offset) = offset {
        rotation *= offset;
    }
    apply_correction(rotation.normalize(), correction)
}

/// 髋部平移策略
///
/// 修改后髋部及其子孙骨骼的世界矩阵失效，由调用方重新计算。
pub fn apply_root_policy(
    target: &mut Skeleton,
    target_hip: Option<usize>,
    source: &Skeleton,
    source_hip: Option<usize>,
    options: &RetargetOptions,
) -> SkeletonResult<RootMotion> {
    let Some(target_hip) = target_hip else {
        return Ok(RootMotion::Skipped);
    };

    if options.preserve_root_position {
        if let Some(bind) = target.bind_transform(target_hip).copied() {
            target.set_local_translation(target_hip, bind.translation)?;
            return Ok(RootMotion::Preserved);
        }
        return Ok(RootMotion::Skipped);
    }

    let Some(source_translation) = source_hip
        .and_then(|index| source.local_transform(index))
        .map(|t| t.translation)
    else {
        return Ok(RootMotion::Skipped);
    };

    let translation = match options.coordinate_correction {
        Some(correction) => correction * source_translation,
        None => source_translation,
    };
    target.set_local_translation(target_hip, translation)?;
    Ok(RootMotion::Transferred)
}
