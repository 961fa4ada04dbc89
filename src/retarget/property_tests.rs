//! 重定向属性测试
//!
//! 使用 proptest 在随机生成的骨骼树上验证重定向的不变量

use glam::{Quat, Vec3};
use proptest::prelude::*;

use crate::animation::{Bone, BoneTransform, Skeleton, SkeletonPose};
use crate::retarget::{retarget, BoneNameMap, RetargetOptions};

fn angle() -> impl Strategy<Value = f32> {
    -3.14f32..3.14
}

fn valid_quat() -> impl Strategy<Value = Quat> {
    (angle(), angle(), angle())
        .prop_map(|(x, y, z)| Quat::from_euler(glam::EulerRot::XYZ, x, y, z))
}

fn offset() -> impl Strategy<Value = Vec3> {
    (-2.0f32..2.0, 0.1f32..2.0, -2.0f32..2.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

// 父骨骼索引总是小于自身索引的随机树
fn parents() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1usize..24).prop_flat_map(|count| {
        (0..count)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    (0..i).prop_map(Some).boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn build(parents: &[Option<usize>], transforms: &[BoneTransform]) -> Skeleton {
    let bones = parents
        .iter()
        .zip(transforms)
        .enumerate()
        .map(|(i, (parent, transform))| {
            Bone::new(format!("bone_{}", i), *parent).with_transform(*transform)
        })
        .collect();
    Skeleton::new(bones).unwrap()
}

// 随机树以及同拓扑的源、目标骨骼变换
fn rig_pair() -> impl Strategy<Value = (Vec<Option<usize>>, Vec<BoneTransform>, Vec<BoneTransform>)>
{
    parents().prop_flat_map(|parents| {
        let count = parents.len();
        let source = proptest::collection::vec(
            (offset(), valid_quat()).prop_map(|(t, r)| BoneTransform::new(t, r, Vec3::ONE)),
            count,
        );
        let target = proptest::collection::vec(
            (offset(), valid_quat(), 0.5f32..2.0)
                .prop_map(|(t, r, s)| BoneTransform::new(t, r, Vec3::splat(s))),
            count,
        );
        (Just(parents), source, target)
    })
}

fn same_rotation(a: Quat, b: Quat) -> bool {
    a.normalize().dot(b.normalize()).abs() > 1.0 - 1e-3
}

proptest! {
    #[test]
    fn retarget_changes_only_rotation((parents, source_t, target_t) in rig_pair()) {
        let source = build(&parents, &source_t);
        let mut target = build(&parents, &target_t);
        let before = SkeletonPose::from_skeleton(&target);

        retarget(&mut target, &source, &RetargetOptions::new()).unwrap();

        let after = SkeletonPose::from_skeleton(&target);
        for (a, b) in before.bone_transforms.iter().zip(after.bone_transforms.iter()) {
            prop_assert_eq!(a.translation, b.translation);
            prop_assert_eq!(a.scale, b.scale);
        }
    }

    #[test]
    fn retarget_reproduces_source_world_rotations((parents, source_t, target_t) in rig_pair()) {
        let source = build(&parents, &source_t);
        let mut target = build(&parents, &target_t);

        retarget(&mut target, &source, &RetargetOptions::new()).unwrap();

        for index in 0..parents.len() {
            let (_, expected, _) = source.world_transform(index).unwrap().to_scale_rotation_translation();
            let (_, actual, _) = target.world_transform(index).unwrap().to_scale_rotation_translation();
            prop_assert!(same_rotation(expected, actual));
        }
    }

    #[test]
    fn retarget_is_idempotent_for_held_pose((parents, source_t, target_t) in rig_pair()) {
        let source = build(&parents, &source_t);
        let mut target = build(&parents, &target_t);
        let options = RetargetOptions::new().with_hip("bone_0");

        retarget(&mut target, &source, &options).unwrap();
        let first = target.world_matrices().to_vec();
        retarget(&mut target, &source, &options).unwrap();
        let second = target.world_matrices().to_vec();
        retarget(&mut target, &source, &options).unwrap();
        let third = target.world_matrices().to_vec();

        prop_assert_eq!(&second, &third);
        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert!(a.abs_diff_eq(*b, 1e-3));
        }
    }

    #[test]
    fn unmapped_bone_keeps_its_pose(
        (parents, source_t, target_t) in rig_pair(),
        pick in any::<prop::sample::Index>(),
    ) {
        let source = build(&parents, &source_t);
        let mut target = build(&parents, &target_t);
        let unmapped = pick.index(parents.len());
        let names: BoneNameMap = [(format!("bone_{}", unmapped), "extra_twist".to_string())]
            .into_iter()
            .collect();
        let before = *target.local_transform(unmapped).unwrap();

        let stats = retarget(&mut target, &source, &RetargetOptions::new().with_names(names)).unwrap();

        prop_assert_eq!(stats.skipped, 1);
        prop_assert_eq!(*target.local_transform(unmapped).unwrap(), before);
    }
}
