//! 单骨骼朝向转移
//!
//! 只转移旋转：读取源骨骼世界矩阵的旋转部分，结合目标绑定姿态与修正，
//! 与目标骨骼自身本帧的世界位置组合后，借助父骨骼本帧已更新的世界矩阵分解回局部变换。
//! 目标骨骼的平移与缩放保持不变，因此不同比例的角色不会被拉伸成动捕演员的骨长。

use glam::{Mat4, Quat, Vec3};

use crate::animation::Skeleton;
use crate::core::error::{RetargetError, RetargetResult, SkeletonError};

use super::options::RetargetOptions;
use super::pose_policy::compose_world_rotation;

// 去掉缩放后提取旋转
fn rotation_of(matrix: Mat4) -> Quat {
    let (_, rotation, _) = matrix.to_scale_rotation_translation();
    rotation.normalize()
}

/// 源骨骼的旋转
///
/// `use_target_world_matrix` 为 true 时取世界矩阵，否则取相对该骨骼所在树的根骨骼的矩阵。
/// 源骨骼必须已经完成本帧采样（世界矩阵有效）。
pub fn source_rotation(
    source: &Skeleton,
    source_bone: usize,
    use_target_world_matrix: bool,
) -> RetargetResult<Quat> {
    let bone = source
        .get_bone(source_bone)
        .ok_or(SkeletonError::BoneOutOfRange(source_bone))?;
    if !source.is_world_valid(source_bone) {
        return Err(RetargetError::SourceNotFinalized {
            bone: bone.name.clone(),
        });
    }

    let world = source.world_transform(source_bone)?;
    let matrix = if use_target_world_matrix {
        world
    } else {
        source.world_transform(source.root_of(source_bone)?)?.inverse() * world
    };
    Ok(rotation_of(matrix))
}

/// 重定向单个目标骨骼
///
/// 目标骨骼的父骨骼世界矩阵必须在本帧已更新，否则返回 `StaleParent`。
/// 完成后目标骨骼的世界矩阵已更新，子骨骼可以继续处理。
pub fn retarget_bone(
    target: &mut Skeleton,
    target_bone: usize,
    source: &Skeleton,
    source_bone: usize,
    canonical: &str,
    options: &RetargetOptions,
) -> RetargetResult<()> {
    let source_rot = source_rotation(source, source_bone, options.use_target_world_matrix)?;

    let bone = target
        .get_bone(target_bone)
        .ok_or(SkeletonError::BoneOutOfRange(target_bone))?;
    let bind = bone.inverse_bind_matrix.map(|m| rotation_of(m.inverse()));
    let scale = bone.local_transform.scale;

    let world_rot = compose_world_rotation(
        source_rot,
        bind,
        options.bind_offset(canonical),
        options.coordinate_correction,
    );

    // 位置来自目标骨骼自身，不从源骨骼读取
    let position: Vec3 = target.world_transform(target_bone)?.w_axis.truncate();
    let world = Mat4::from_rotation_translation(world_rot, position) * Mat4::from_scale(scale);

    let local = target.local_from_world(target_bone, world)?;
    target.set_local_rotation(target_bone, local.rotation.normalize())?;
    target.update_world(target_bone)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Bone, BoneTransform};
    use std::f32::consts::FRAC_PI_2;

    fn chain(name_prefix: &str, spine: f32, head: f32) -> Skeleton {
        Skeleton::new(vec![
            Bone::new(format!("{}root", name_prefix), None),
            Bone::new(format!("{}spine", name_prefix), Some(0))
                .with_transform(BoneTransform::from_translation(Vec3::new(0.0, spine, 0.0))),
            Bone::new(format!("{}head", name_prefix), Some(1))
                .with_transform(BoneTransform::from_translation(Vec3::new(0.0, head, 0.0))),
        ])
        .unwrap()
    }

    #[test]
    fn test_source_rotation_world_and_relative() {
        let mut source = chain("", 1.2, 0.3);
        source.set_local_rotation(0, Quat::from_rotation_y(FRAC_PI_2)).unwrap();
        source.set_local_rotation(1, Quat::from_rotation_x(FRAC_PI_2)).unwrap();
        source.update_world_matrices();

        let world = source_rotation(&source, 2, true).unwrap();
        let expected = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(FRAC_PI_2);
        assert!(world.dot(expected).abs() > 1.0 - 1e-5);

        let relative = source_rotation(&source, 2, false).unwrap();
        assert!(relative.dot(Quat::from_rotation_x(FRAC_PI_2)).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn test_source_must_be_finalized() {
        let mut source = chain("", 1.2, 0.3);
        source.set_local_rotation(1, Quat::from_rotation_x(FRAC_PI_2)).unwrap();
        assert_eq!(
            source_rotation(&source, 2, true).unwrap_err(),
            RetargetError::SourceNotFinalized {
                bone: "head".to_string()
            }
        );
    }

    #[test]
    fn test_retarget_bone_changes_rotation_only() {
        let mut source = chain("", 1.2, 0.3);
        source.set_local_rotation(1, Quat::from_rotation_x(FRAC_PI_2)).unwrap();
        source.update_world_matrices();

        let mut target = chain("", 1.0, 0.5);
        let before = *target.local_transform(1).unwrap();
        retarget_bone(&mut target, 1, &source, 1, "spine", &RetargetOptions::new()).unwrap();
        let after = *target.local_transform(1).unwrap();

        assert_eq!(before.translation, after.translation);
        assert_eq!(before.scale, after.scale);
        assert!(after.rotation.dot(Quat::from_rotation_x(FRAC_PI_2)).abs() > 1.0 - 1e-5);
        assert!(target.is_world_valid(1));
        assert!(!target.is_world_valid(2));
    }

    #[test]
    fn test_retarget_bone_with_stale_parent_fails() {
        let source = chain("", 1.2, 0.3);
        let mut target = chain("", 1.0, 0.5);
        target.set_local_rotation(1, Quat::from_rotation_z(0.5)).unwrap();

        let err = retarget_bone(&mut target, 2, &source, 2, "head", &RetargetOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            RetargetError::Skeleton(SkeletonError::StaleParent { .. })
        ));
    }

    #[test]
    fn test_skinned_bone_uses_bind_rotation() {
        let source = chain("", 1.2, 0.3);
        let bind_rot = Quat::from_rotation_z(FRAC_PI_2);
        let mut target = Skeleton::new(vec![Bone::new("root", None)
            .with_transform(BoneTransform::new(Vec3::ZERO, bind_rot, Vec3::ONE))
            .with_inverse_bind_matrix(Mat4::from_quat(bind_rot).inverse())])
        .unwrap();

        retarget_bone(&mut target, 0, &source, 0, "root", &RetargetOptions::new()).unwrap();

        // 源骨骼处于单位旋转时，蒙皮骨骼保持其绑定旋转
        let rotation = target.local_transform(0).unwrap().rotation;
        assert!(rotation.dot(bind_rot).abs() > 1.0 - 1e-5);
    }

    #[test]
    fn test_relative_rotation_uses_own_tree_root() {
        let mut source = Skeleton::new(vec![
            Bone::new("prop", None),
            Bone::new("hip", None),
            Bone::new("head", Some(1)),
        ])
        .unwrap();
        source.set_local_rotation(0, Quat::from_rotation_y(0.5)).unwrap();
        source.set_local_rotation(1, Quat::from_rotation_x(0.3)).unwrap();
        source.set_local_rotation(2, Quat::from_rotation_z(0.2)).unwrap();
        source.update_world_matrices();

        let relative = source_rotation(&source, 2, false).unwrap();
        assert!(relative.dot(Quat::from_rotation_z(0.2)).abs() > 1.0 - 1e-5);
        let root = source_rotation(&source, 1, false).unwrap();
        assert!(root.dot(Quat::IDENTITY).abs() > 1.0 - 1e-5);
    }
}
