//! 重定向性能基准测试
//!
//! 测试世界矩阵更新、计划构建以及整帧重定向的性能

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Quat, Vec3};
use retarget_engine::animation::{Bone, BoneTransform, Skeleton};
use retarget_engine::retarget::{RetargetOptions, RetargetPlan, RetargetService};

// 每个骨骼挂在前面某个骨骼下，形成分支较多的树
fn rig(count: usize, length: f32) -> Skeleton {
    let bones = (0..count)
        .map(|i| {
            let parent = if i == 0 { None } else { Some((i - 1) / 2) };
            Bone::new(format!("bone_{}", i), parent).with_transform(BoneTransform::new(
                Vec3::new(0.0, length, 0.0),
                Quat::from_rotation_z(0.01 * i as f32),
                Vec3::ONE,
            ))
        })
        .collect();
    Skeleton::new(bones).unwrap()
}

fn pose(source: &mut Skeleton, t: f32) {
    for i in 0..source.bone_count() {
        source
            .set_local_rotation(i, Quat::from_rotation_x((t + i as f32).sin() * 0.5))
            .unwrap();
    }
    source.update_world_matrices();
}

fn bench_world_matrices(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_matrices");

    for count in [24, 65, 256] {
        let mut skeleton = rig(count, 0.2);
        group.bench_with_input(BenchmarkId::new("update_all", count), &count, |b, _| {
            b.iter(|| {
                skeleton.invalidate_all();
                skeleton.update_world_matrices();
                black_box(skeleton.world_matrices().len())
            });
        });
    }

    group.finish();
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("retarget_plan");

    for count in [24, 65, 256] {
        let source = rig(count, 0.3);
        let target = rig(count, 0.2);
        let options = RetargetOptions::new();
        group.bench_with_input(BenchmarkId::new("build", count), &count, |b, _| {
            b.iter(|| black_box(RetargetPlan::new(&target, &source, &options).unwrap()));
        });
    }

    group.finish();
}

fn bench_retarget_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("retarget_frame");

    for count in [24, 65, 256] {
        let mut source = rig(count, 0.3);
        pose(&mut source, 0.7);
        let mut target = rig(count, 0.2);
        let options = RetargetOptions::new().with_coordinate_correction(Quat::from_rotation_y(
            std::f32::consts::PI,
        ));
        let plan = RetargetPlan::new(&target, &source, &options).unwrap();

        group.bench_with_input(BenchmarkId::new("cached_plan", count), &count, |b, _| {
            b.iter(|| {
                black_box(
                    RetargetService::retarget_with_plan(&mut target, &source, &options, &plan)
                        .unwrap(),
                )
            });
        });
        group.bench_with_input(BenchmarkId::new("fresh_plan", count), &count, |b, _| {
            b.iter(|| {
                black_box(RetargetService::retarget(&mut target, &source, &options).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_world_matrices, bench_plan, bench_retarget_frame);
criterion_main!(benches);
