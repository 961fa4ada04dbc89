//! 重定向系统
//!
//! 目标骨骼实体挂载 `RetargetTarget` 组件指向源骨骼实体。
//! `skeleton_update_system` 在采样之后更新源骨骼世界矩阵，
//! `retarget_system` 随后逐个目标执行重定向，并按需重建缓存的计划。

use std::sync::Arc;

use bevy_ecs::prelude::*;

use crate::animation::Skeleton;

use super::options::RetargetOptions;
use super::plan::RetargetPlan;
use super::service::RetargetService;

/// 重定向目标组件
///
/// 挂在目标骨骼实体上，指向提供动作的源骨骼实体。
/// 源骨骼实体本身不能再是重定向目标。
#[derive(Component, Clone, Debug)]
pub struct RetargetTarget {
    /// 源骨骼实体
    pub source: Entity,
    /// 共享的只读选项
    pub options: Arc<RetargetOptions>,
    plan: Option<CachedPlan>,
}

// 计划以及构建它时使用的源实体与选项
#[derive(Clone, Debug)]
struct CachedPlan {
    plan: RetargetPlan,
    source: Entity,
    options: Arc<RetargetOptions>,
}

impl CachedPlan {
    fn is_current(&self, link: &RetargetTarget, target: &Skeleton, source: &Skeleton) -> bool {
        self.source == link.source
            && Arc::ptr_eq(&self.options, &link.options)
            && self.plan.check(target, source).is_ok()
    }
}

impl RetargetTarget {
    pub fn new(source: Entity, options: Arc<RetargetOptions>) -> Self {
        Self {
            source,
            options,
            plan: None,
        }
    }

    /// 当前缓存的计划（首次运行前为 None）
    pub fn plan(&self) -> Option<&RetargetPlan> {
        self.plan.as_ref().map(|cached| &cached.plan)
    }
}

/// 源骨骼更新系统
///
/// 在采样器写入本帧局部变换之后、重定向之前运行，更新源骨骼的世界矩阵。
pub fn skeleton_update_system(mut sources: Query<&mut Skeleton, Without<RetargetTarget>>) {
    for mut skeleton in sources.iter_mut() {
        if skeleton.first_stale_bone().is_some() {
            skeleton.update_world_matrices();
        }
    }
}

/// 重定向系统
///
/// 单个目标内部按父骨骼优先顺序串行执行；目标之间互不依赖，只读取源骨骼。
/// 出错时记录日志并跳过该目标，不中断帧循环。
pub fn retarget_system(
    sources: Query<&Skeleton, Without<RetargetTarget>>,
    mut targets: Query<(Entity, &mut Skeleton, &mut RetargetTarget), With<RetargetTarget>>,
) {
    for (entity, mut skeleton, mut link) in targets.iter_mut() {
        let Ok(source) = sources.get(link.source) else {
            tracing::warn!(
                target: "retarget",
                ?entity,
                source = ?link.source,
                "Retarget source entity has no skeleton"
            );
            continue;
        };

        let link = &mut *link;
        let current = link
            .plan
            .as_ref()
            .is_some_and(|cached| cached.is_current(link, &skeleton, source));
        if !current {
            match RetargetPlan::new(&skeleton, source, &link.options) {
                Ok(plan) => {
                    tracing::debug!(target: "retarget", ?entity, source = ?link.source, "Retarget plan rebuilt");
                    link.plan = Some(CachedPlan {
                        plan,
                        source: link.source,
                        options: link.options.clone(),
                    });
                }
                Err(err) => {
                    link.plan = None;
                    tracing::error!(target: "retarget", ?entity, "Failed to build retarget plan: {}", err);
                    continue;
                }
            }
        }

        if let Some(cached) = &link.plan {
            if let Err(err) = RetargetService::retarget_with_plan(
                &mut skeleton,
                source,
                &link.options,
                &cached.plan,
            ) {
                tracing::error!(target: "retarget", ?entity, "Retarget pass failed: {}", err);
            }
        }
    }
}
