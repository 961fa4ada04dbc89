//! 重定向计划
//!
//! 针对一对（源骨骼, 目标骨骼）预先计算遍历顺序、骨骼对应关系和髋部索引，
//! 之后每帧复用。计划同时记录两副骨骼的结构（骨骼名与父骨骼索引），
//! 每帧使用前逐骨骼核对，结构不同的骨骼即使数量相同也会被拒绝。

use crate::animation::{traversal_order, Skeleton, TraversalOrder};
use crate::core::error::{RetargetError, RetargetResult};

use super::bone_map::{resolve, SourceIndex};
use super::options::RetargetOptions;

/// 单个目标骨骼的对应关系
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoneBinding {
    /// 目标骨骼的规范名
    pub canonical: String,
    /// 对应的源骨骼索引，None 表示跳过
    pub source: Option<usize>,
}

// 构建计划时骨骼的结构快照
#[derive(Clone, Debug, PartialEq, Eq)]
struct SkeletonLayout {
    bones: Vec<(String, Option<usize>)>,
}

impl SkeletonLayout {
    fn of(skeleton: &Skeleton) -> Self {
        Self {
            bones: skeleton
                .bones()
                .iter()
                .map(|bone| (bone.name.clone(), bone.parent_index))
                .collect(),
        }
    }

    fn check(&self, skeleton: &Skeleton, side: &'static str) -> RetargetResult<()> {
        if skeleton.bone_count() != self.bones.len() {
            return Err(RetargetError::PlanMismatch {
                expected: self.bones.len(),
                actual: skeleton.bone_count(),
            });
        }
        for ((name, parent), bone) in self.bones.iter().zip(skeleton.bones()) {
            if *name != bone.name || *parent != bone.parent_index {
                return Err(RetargetError::LayoutMismatch {
                    skeleton: side,
                    bone: bone.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// 重定向计划
#[derive(Clone, Debug)]
pub struct RetargetPlan {
    order: TraversalOrder,
    bindings: Vec<BoneBinding>,
    target_hip: Option<usize>,
    source_hip: Option<usize>,
    target_layout: SkeletonLayout,
    source_layout: SkeletonLayout,
}

impl RetargetPlan {
    pub fn new(
        target: &Skeleton,
        source: &Skeleton,
        options: &RetargetOptions,
    ) -> RetargetResult<Self> {
        options.validate()?;

        let index = SourceIndex::build(source, options.source_names.as_ref());
        let bindings: Vec<BoneBinding> = target
            .bones()
            .iter()
            .map(|bone| BoneBinding {
                canonical: options.names.canonical_name(&bone.name).to_string(),
                source: resolve(&bone.name, &options.names, &index),
            })
            .collect();

        let target_hip = bindings.iter().position(|b| b.canonical == options.hip);
        let source_hip = index.find(&options.hip);

        let plan = Self {
            order: traversal_order(target),
            bindings,
            target_hip,
            source_hip,
            target_layout: SkeletonLayout::of(target),
            source_layout: SkeletonLayout::of(source),
        };

        tracing::debug!(
            target: "retarget",
            bones = plan.bindings.len(),
            mapped = plan.mapped_count(),
            hip = ?plan.target_hip,
            "Retarget plan built"
        );
        Ok(plan)
    }

    /// 目标骨骼的父骨骼优先遍历顺序
    pub fn order(&self) -> &TraversalOrder {
        &self.order
    }

    pub fn binding(&self, target_bone: usize) -> Option<&BoneBinding> {
        self.bindings.get(target_bone)
    }

    pub fn bindings(&self) -> &[BoneBinding] {
        &self.bindings
    }

    pub fn target_hip(&self) -> Option<usize> {
        self.target_hip
    }

    pub fn source_hip(&self) -> Option<usize> {
        self.source_hip
    }

    /// 找到源骨骼的目标骨骼数量
    pub fn mapped_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.source.is_some()).count()
    }

    /// 检查计划与两副骨骼的结构是否一致
    pub fn check(&self, target: &Skeleton, source: &Skeleton) -> RetargetResult<()> {
        self.target_layout.check(target, "target")?;
        self.source_layout.check(source, "source")
    }
}
