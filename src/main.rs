//! 重定向演示
//!
//! 用程序生成的点头动作驱动动捕骨骼，并把动作重定向到比例不同、命名不同的角色骨骼上。

use std::sync::Arc;

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use retarget_engine::animation::{Bone, BoneTransform, Skeleton};
use retarget_engine::config::RetargetConfig;
use retarget_engine::core::{initialize_logging, EngineResult};
use retarget_engine::retarget::{retarget_system, skeleton_update_system, RetargetTarget};

const FRAMES: usize = 8;

fn capture_skeleton() -> EngineResult<Skeleton> {
    Ok(Skeleton::new(vec![
        Bone::new("hip", None)
            .with_transform(BoneTransform::from_translation(Vec3::new(0.0, 1.0, 0.0))),
        Bone::new("spine", Some(0))
            .with_transform(BoneTransform::from_translation(Vec3::new(0.0, 0.6, 0.0))),
        Bone::new("neck", Some(1))
            .with_transform(BoneTransform::from_translation(Vec3::new(0.0, 0.5, 0.0))),
        Bone::new("head", Some(2))
            .with_transform(BoneTransform::from_translation(Vec3::new(0.0, 0.15, 0.0))),
    ])?)
}

fn character_skeleton() -> EngineResult<Skeleton> {
    Ok(Skeleton::new(vec![
        Bone::new("mixamorig:Hips", None)
            .with_transform(BoneTransform::from_translation(Vec3::new(0.0, 0.8, 0.0))),
        Bone::new("mixamorig:Spine", Some(0))
            .with_transform(BoneTransform::from_translation(Vec3::new(0.0, 0.4, 0.0))),
        Bone::new("mixamorig:Neck", Some(1))
            .with_transform(BoneTransform::from_translation(Vec3::new(0.0, 0.35, 0.0))),
        Bone::new("mixamorig:Head", Some(2))
            .with_transform(BoneTransform::from_translation(Vec3::new(0.0, 0.1, 0.0))),
        Bone::new("mixamorig:HeadTop_End", Some(3))
            .with_transform(BoneTransform::from_translation(Vec3::new(0.0, 0.2, 0.0))),
    ])?)
}

fn default_bone_map(config: &mut RetargetConfig) {
    if !config.bone_map.is_empty() {
        return;
    }
    for (bone, canonical) in [
        ("mixamorig:Hips", "hip"),
        ("mixamorig:Spine", "spine"),
        ("mixamorig:Neck", "neck"),
        ("mixamorig:Head", "head"),
    ] {
        config.bone_map.insert(bone.to_string(), canonical.to_string());
    }
}

fn run() -> EngineResult<()> {
    let mut config = RetargetConfig::load_or_default();
    config.apply_env_overrides();
    default_bone_map(&mut config);
    initialize_logging(&config.logging);

    let options = Arc::new(config.to_options()?);

    let mut world = World::default();
    let source = world.spawn(capture_skeleton()?).id();
    let target = world
        .spawn((character_skeleton()?, RetargetTarget::new(source, options)))
        .id();

    let mut schedule = Schedule::default();
    schedule.add_systems((skeleton_update_system, retarget_system).chain());

    for frame in 0..FRAMES {
        let angle = (frame as f32 / FRAMES as f32 * std::f32::consts::TAU).sin() * 0.6;
        if let Some(mut skeleton) = world.get_mut::<Skeleton>(source) {
            // 代替动画采样器：写入本帧的局部变换
            skeleton.set_local_rotation(3, Quat::from_rotation_x(angle))?;
            skeleton.set_local_translation(0, Vec3::new(0.1 * frame as f32, 1.0, 0.0))?;
        }

        schedule.run(&mut world);

        if let Some(skeleton) = world.get::<Skeleton>(target) {
            let head = skeleton.world_transform(3)?;
            let (_, rotation, position) = head.to_scale_rotation_translation();
            let (axis, head_angle) = rotation.to_axis_angle();
            tracing::info!(
                target: "demo",
                frame,
                source_angle = angle,
                head_angle = head_angle * axis.x.signum(),
                head_position = ?position,
                "Retargeted frame"
            );
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Retarget demo failed: {}", e);
        std::process::exit(1);
    }
}
