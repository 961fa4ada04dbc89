//! 骨骼数据结构
//!
//! 定义骨骼层级、骨骼节点及其局部/世界变换。
//!
//! ## 前置条件
//!
//! 骨骼必须构成无环的树（或由多棵树组成的森林），名称唯一。
//! `Skeleton::new` 会拒绝不满足条件的输入。
//!
//! ## 世界矩阵缓存
//!
//! 修改骨骼的局部变换会使该骨骼及其所有子孙骨骼的世界矩阵失效，
//! 但不会自动重新计算；重新计算由遍历调度负责（见 [`Skeleton::update_world_matrices`]）。
//! 在父骨骼世界矩阵失效时读取子骨骼的世界矩阵会返回 `SkeletonError::StaleParent`。

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::error::{SkeletonError, SkeletonResult};

use super::traversal::TraversalOrder;

// ============================================================================
// 骨骼变换
// ============================================================================

/// 骨骼变换（平移、旋转、非均匀缩放）
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl BoneTransform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// 转换为 4x4 矩阵
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// 从 4x4 矩阵分解
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

// ============================================================================
// 骨骼节点
// ============================================================================

/// 骨骼节点
#[derive(Clone, Debug)]
pub struct Bone {
    /// 骨骼名称
    pub name: String,
    /// 父骨骼索引（None 表示根骨骼）
    pub parent_index: Option<usize>,
    /// 子骨骼索引列表（由 `Skeleton::new` 根据父骨骼索引重建）
    pub children_indices: Vec<usize>,
    /// 局部变换（相对于父骨骼）
    pub local_transform: BoneTransform,
    /// 逆绑定矩阵，仅蒙皮骨骼拥有
    pub inverse_bind_matrix: Option<Mat4>,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent_index: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent_index,
            children_indices: Vec::new(),
            local_transform: BoneTransform::identity(),
            inverse_bind_matrix: None,
        }
    }

    pub fn with_transform(mut self, transform: BoneTransform) -> Self {
        self.local_transform = transform;
        self
    }

    pub fn with_inverse_bind_matrix(mut self, matrix: Mat4) -> Self {
        self.inverse_bind_matrix = Some(matrix);
        self
    }
}

// ============================================================================
// 骨骼层级（Skeleton）
// ============================================================================

/// 骨骼层级组件
///
/// 骨骼的插入顺序有意义：它对应动画片段写入通道的顺序。
#[derive(Component, Clone, Debug)]
pub struct Skeleton {
    bones: Vec<Bone>,
    bone_name_to_index: HashMap<String, usize>,
    /// 构建时的局部变换，作为绑定姿态
    bind_pose: Vec<BoneTransform>,
    world_matrices: Vec<Mat4>,
    world_valid: Vec<bool>,
    traversal: TraversalOrder,
    root: usize,
}

impl Skeleton {
    /// 创建新的骨骼层级
    ///
    /// 校验父骨骼索引、名称唯一性与无环性，重建子骨骼列表，
    /// 并计算初始世界矩阵。
    pub fn new(mut bones: Vec<Bone>) -> SkeletonResult<Self> {
        if bones.is_empty() {
            return Err(SkeletonError::Empty);
        }

        let count = bones.len();
        let mut bone_name_to_index = HashMap::with_capacity(count);
        for (index, bone) in bones.iter().enumerate() {
            match bone.parent_index {
                Some(parent) if parent == index => {
                    return Err(SkeletonError::SelfParent(bone.name.clone()));
                }
                Some(parent) if parent >= count => {
                    return Err(SkeletonError::InvalidParent {
                        bone: bone.name.clone(),
                        parent,
                    });
                }
                _ => {}
            }
            if bone_name_to_index.insert(bone.name.clone(), index).is_some() {
                return Err(SkeletonError::DuplicateName(bone.name.clone()));
            }
        }

        // 建立子骨骼索引
        for bone in bones.iter_mut() {
            bone.children_indices.clear();
        }
        for index in 0..count {
            if let Some(parent) = bones[index].parent_index {
                bones[parent].children_indices.push(index);
            }
        }

        let names: Vec<String> = bones.iter().map(|b| b.name.clone()).collect();
        let parents: Vec<Option<usize>> = bones.iter().map(|b| b.parent_index).collect();
        let children: Vec<Vec<usize>> = bones.iter().map(|b| b.children_indices.clone()).collect();
        let traversal = TraversalOrder::build(&names, &parents, &children)?;

        let root = parents
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| SkeletonError::Cycle(names[0].clone()))?;

        let mut skeleton = Self {
            bind_pose: bones.iter().map(|b| b.local_transform).collect(),
            world_matrices: vec![Mat4::IDENTITY; count],
            world_valid: vec![false; count],
            bones,
            bone_name_to_index,
            traversal,
            root,
        };
        skeleton.update_world_matrices();

        tracing::debug!(
            target: "skeleton",
            bones = count,
            root = %skeleton.bones[root].name,
            "Skeleton built"
        );
        Ok(skeleton)
    }

    /// 从无层级信息的骨骼列表创建骨骼，所有骨骼都是根骨骼
    pub fn from_unparented<I, S>(bones: I) -> SkeletonResult<Self>
    where
        I: IntoIterator<Item = (S, BoneTransform)>,
        S: Into<String>,
    {
        Self::new(
            bones
                .into_iter()
                .map(|(name, transform)| Bone::new(name, None).with_transform(transform))
                .collect(),
        )
    }

    /// 获取骨骼数量
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// 通过名称获取骨骼索引
    pub fn get_bone_index(&self, name: &str) -> Option<usize> {
        self.bone_name_to_index.get(name).copied()
    }

    /// 获取骨骼
    pub fn get_bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// 指定的根骨骼（插入顺序中的第一个根骨骼）
    pub fn root(&self) -> usize {
        self.root
    }

    /// 骨骼所在树的根骨骼
    pub fn root_of(&self, index: usize) -> SkeletonResult<usize> {
        let mut current = index;
        while let Some(parent) = self.bone_checked(current)?.parent_index {
            current = parent;
        }
        Ok(current)
    }

    /// 所有根骨骼
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent_index.is_none())
            .map(|(i, _)| i)
    }

    /// 父骨骼优先的遍历顺序
    pub fn traversal(&self) -> &TraversalOrder {
        &self.traversal
    }

    /// 骨骼的绑定姿态局部变换
    pub fn bind_transform(&self, index: usize) -> Option<&BoneTransform> {
        self.bind_pose.get(index)
    }

    pub fn local_transform(&self, index: usize) -> Option<&BoneTransform> {
        self.bones.get(index).map(|b| &b.local_transform)
    }

    fn bone_checked(&self, index: usize) -> SkeletonResult<&Bone> {
        self.bones
            .get(index)
            .ok_or(SkeletonError::BoneOutOfRange(index))
    }

    fn bone_checked_mut(&mut self, index: usize) -> SkeletonResult<&mut Bone> {
        self.bones
            .get_mut(index)
            .ok_or(SkeletonError::BoneOutOfRange(index))
    }

    /// 设置骨骼局部变换，使该骨骼及其子孙骨骼的世界矩阵失效
    pub fn set_local_transform(
        &mut self,
        index: usize,
        transform: BoneTransform,
    ) -> SkeletonResult<()> {
        self.bone_checked_mut(index)?.local_transform = transform;
        self.invalidate(index);
        Ok(())
    }

    pub fn set_local_rotation(&mut self, index: usize, rotation: Quat) -> SkeletonResult<()> {
        self.bone_checked_mut(index)?.local_transform.rotation = rotation;
        self.invalidate(index);
        Ok(())
    }

    pub fn set_local_translation(
        &mut self,
        index: usize,
        translation: Vec3,
    ) -> SkeletonResult<()> {
        self.bone_checked_mut(index)?.local_transform.translation = translation;
        self.invalidate(index);
        Ok(())
    }

    /// 恢复绑定姿态
    pub fn reset_to_bind_pose(&mut self) {
        for (bone, bind) in self.bones.iter_mut().zip(self.bind_pose.iter()) {
            bone.local_transform = *bind;
        }
        self.world_valid.fill(false);
    }

    // 有效骨骼的父骨骼必然有效，所以遇到已失效的骨骼可以跳过其子树
    fn invalidate(&mut self, index: usize) {
        let mut stack = vec![index];
        while let Some(i) = stack.pop() {
            if !self.world_valid[i] {
                continue;
            }
            self.world_valid[i] = false;
            stack.extend(self.bones[i].children_indices.iter().copied());
        }
    }

    /// 使所有世界矩阵失效（例如采样器整体写入新姿态之后）
    pub fn invalidate_all(&mut self) {
        self.world_valid.fill(false);
    }

    /// 骨骼世界矩阵在本帧是否已计算
    pub fn is_world_valid(&self, index: usize) -> bool {
        self.world_valid.get(index).copied().unwrap_or(false)
    }

    /// 第一个世界矩阵失效的骨骼（按插入顺序）
    pub fn first_stale_bone(&self) -> Option<usize> {
        self.world_valid.iter().position(|valid| !valid)
    }

    fn parent_world(&self, index: usize) -> SkeletonResult<Mat4> {
        let bone = self.bone_checked(index)?;
        match bone.parent_index {
            None => Ok(Mat4::IDENTITY),
            Some(parent) if self.world_valid[parent] => Ok(self.world_matrices[parent]),
            Some(parent) => Err(SkeletonError::StaleParent {
                bone: bone.name.clone(),
                parent: self.bones[parent].name.clone(),
            }),
        }
    }

    /// 骨骼世界矩阵（parent.world ∘ local）
    ///
    /// 若缓存有效直接返回；否则在父骨骼世界矩阵有效时即时计算（不写入缓存）。
    pub fn world_transform(&self, index: usize) -> SkeletonResult<Mat4> {
        let bone = self.bone_checked(index)?;
        if self.world_valid[index] {
            return Ok(self.world_matrices[index]);
        }
        Ok(self.parent_world(index)? * bone.local_transform.to_matrix())
    }

    /// 重新计算单个骨骼的世界矩阵并写入缓存
    pub fn update_world(&mut self, index: usize) -> SkeletonResult<Mat4> {
        let world = self.parent_world(index)? * self.bones[index].local_transform.to_matrix();
        self.world_matrices[index] = world;
        self.world_valid[index] = true;
        Ok(world)
    }

    /// 把世界空间矩阵分解为该骨骼的局部变换
    ///
    /// 使用父骨骼本帧的世界矩阵；父骨骼失效时返回 `StaleParent`。
    pub fn local_from_world(&self, index: usize, world: Mat4) -> SkeletonResult<BoneTransform> {
        let parent_world = self.parent_world(index)?;
        Ok(BoneTransform::from_matrix(parent_world.inverse() * world))
    }

    /// 按遍历顺序重新计算所有失效的世界矩阵
    pub fn update_world_matrices(&mut self) {
        for slot in 0..self.traversal.len() {
            let index = self.traversal.as_slice()[slot];
            if self.world_valid[index] {
                continue;
            }
            let parent_world = match self.bones[index].parent_index {
                Some(parent) => self.world_matrices[parent],
                None => Mat4::IDENTITY,
            };
            self.world_matrices[index] = parent_world * self.bones[index].local_transform.to_matrix();
            self.world_valid[index] = true;
        }
    }

    /// 所有骨骼的世界矩阵缓存
    ///
    /// 仅在 `first_stale_bone()` 为 `None` 时全部有效。
    pub fn world_matrices(&self) -> &[Mat4] {
        &self.world_matrices
    }

    /// 骨骼世界空间位置
    pub fn world_position(&self, index: usize) -> SkeletonResult<Vec3> {
        Ok(self.world_transform(index)?.w_axis.truncate())
    }

    /// 骨骼到父骨骼的世界空间距离，根骨骼返回 None
    pub fn bone_length(&self, index: usize) -> SkeletonResult<Option<f32>> {
        match self.bone_checked(index)?.parent_index {
            Some(parent) => {
                let head = self.world_position(parent)?;
                let tail = self.world_position(index)?;
                Ok(Some(head.distance(tail)))
            }
            None => Ok(None),
        }
    }

    /// 计算最终蒙皮矩阵（world * inverse_bind），非蒙皮骨骼使用单位矩阵
    pub fn skin_matrices(&self) -> Vec<Mat4> {
        self.bones
            .iter()
            .zip(self.world_matrices.iter())
            .map(|(bone, world)| *world * bone.inverse_bind_matrix.unwrap_or(Mat4::IDENTITY))
            .collect()
    }
}

// ============================================================================
// 骨骼姿态（Pose）
// ============================================================================

/// 骨骼姿态 - 存储所有骨骼的局部变换
///
/// 动画采样器通过它一次性写入源骨骼的整帧姿态。
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonPose {
    /// 每个骨骼的局部变换
    pub bone_transforms: Vec<BoneTransform>,
}

impl SkeletonPose {
    /// 从骨骼当前状态创建姿态
    pub fn from_skeleton(skeleton: &Skeleton) -> Self {
        Self {
            bone_transforms: skeleton.bones.iter().map(|b| b.local_transform).collect(),
        }
    }

    /// 应用姿态到骨骼，多余或缺少的条目被忽略
    pub fn apply_to_skeleton(&self, skeleton: &mut Skeleton) {
        for (bone, transform) in skeleton.bones.iter_mut().zip(self.bone_transforms.iter()) {
            bone.local_transform = *transform;
        }
        skeleton.invalidate_all();
    }
}

// ============================================================================
// 测试
// ============================================================================
