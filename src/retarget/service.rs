//! 重定向服务层
//!
//! 遵循贫血模型，将重定向业务逻辑封装在 Service 中：
//! - Skeleton (Component): 纯数据结构
//! - RetargetService (Service): 封装业务逻辑
//! - retarget_system (System): 调度编排

use crate::animation::Skeleton;
use crate::core::error::{RetargetError, RetargetResult};

use super::options::RetargetOptions;
use super::plan::RetargetPlan;
use super::pose_policy::{apply_root_policy, RootMotion};
use super::retargeter::retarget_bone;

/// 单次重定向的统计信息
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetargetStats {
    /// 完成朝向转移的骨骼数
    pub retargeted: usize,
    /// 没有对应源骨骼而保持原姿态的骨骼数
    pub skipped: usize,
    /// 髋部平移的处理方式
    pub root_motion: RootMotion,
}

/// 重定向服务 - 封装重定向业务逻辑
pub struct RetargetService;

impl RetargetService {
    /// 重定向一帧（每次调用都会重新构建计划）
    pub fn retarget(
        target: &mut Skeleton,
        source: &Skeleton,
        options: &RetargetOptions,
    ) -> RetargetResult<RetargetStats> {
        let plan = RetargetPlan::new(target, source, options)?;
        Self::retarget_with_plan(target, source, options, &plan)
    }

    /// 使用缓存的计划重定向一帧
    ///
    /// 源骨骼必须已完成本帧采样并更新世界矩阵；只读取源骨骼，只修改目标骨骼。
    pub fn retarget_with_plan(
        target: &mut Skeleton,
        source: &Skeleton,
        options: &RetargetOptions,
        plan: &RetargetPlan,
    ) -> RetargetResult<RetargetStats> {
        plan.check(target, source)?;
        if let Some(stale) = source.first_stale_bone() {
            return Err(RetargetError::SourceNotFinalized {
                bone: source.bones()[stale].name.clone(),
            });
        }

        // 目标骨骼的世界矩阵全部作废，按遍历顺序由本帧已完成的父骨骼逐个重新计算，
        // 顺序有误时读取父骨骼会返回 StaleParent
        target.invalidate_all();

        let mut retargeted = 0;
        let mut skipped = 0;
        for bone in plan.order().iter() {
            let Some(binding) = plan.binding(bone) else {
                continue;
            };
            match binding.source {
                Some(source_bone) => {
                    retarget_bone(target, bone, source, source_bone, &binding.canonical, options)?;
                    retargeted += 1;
                }
                None => {
                    tracing::trace!(
                        target: "retarget",
                        bone = %binding.canonical,
                        "No source bone, keeping current pose"
                    );
                    target.update_world(bone)?;
                    skipped += 1;
                }
            }
        }

        let root_motion = apply_root_policy(
            target,
            plan.target_hip(),
            source,
            plan.source_hip(),
            options,
        )?;
        target.update_world_matrices();

        let stats = RetargetStats {
            retargeted,
            skipped,
            root_motion,
        };
        tracing::debug!(target: "retarget", ?stats, "Retarget pass finished");
        Ok(stats)
    }
}

/// 每帧每个目标骨骼调用一次的入口
pub fn retarget(
    target: &mut Skeleton,
    source: &Skeleton,
    options: &RetargetOptions,
) -> RetargetResult<RetargetStats> {
    RetargetService::retarget(target, source, options)
}
