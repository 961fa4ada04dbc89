//! 骨骼名称映射与对应关系解析
//!
//! `BoneNameMap` 把某个模型的骨骼名称映射到规范关节名（如 "hip"、"neck"、"lForeArm"）。
//! 映射表中不存在的骨骼沿用自身名称，以兼容现有的模型命名表。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::animation::Skeleton;

/// 骨骼名称 → 规范关节名
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoneNameMap {
    names: HashMap<String, String>,
}

impl BoneNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一条映射，返回新的映射表
    pub fn with(mut self, bone: impl AsRef<str>, canonical: impl AsRef<str>) -> Self {
        self.insert(bone, canonical);
        self
    }

    pub fn insert(&mut self, bone: impl AsRef<str>, canonical: impl AsRef<str>) {
        self.names
            .insert(bone.as_ref().to_string(), canonical.as_ref().to_string());
    }

    /// 映射表中记录的规范名
    pub fn get(&self, bone: &str) -> Option<&str> {
        self.names.get(bone).map(String::as_str)
    }

    /// 规范名，未映射时回退为骨骼自身名称
    pub fn canonical_name<'a>(&'a self, bone: &'a str) -> &'a str {
        self.get(bone).unwrap_or(bone)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for BoneNameMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (bone, canonical) in iter {
            map.insert(bone, canonical);
        }
        map
    }
}

/// 源骨骼规范名索引
///
/// 源骨骼通常已经使用规范名；若提供了源骨骼映射表，则先经过映射。
#[derive(Clone, Debug, Default)]
pub struct SourceIndex {
    by_canonical: HashMap<String, usize>,
}

impl SourceIndex {
    pub fn build(source: &Skeleton, source_names: Option<&BoneNameMap>) -> Self {
        let mut by_canonical = HashMap::with_capacity(source.bone_count());
        for (index, bone) in source.bones().iter().enumerate() {
            let canonical = match source_names {
                Some(map) => map.canonical_name(&bone.name),
                None => bone.name.as_str(),
            };
            // 多个源骨骼映射到同一规范名时保留第一个
            by_canonical
                .entry(canonical.to_string())
                .or_insert(index);
        }
        Self { by_canonical }
    }

    pub fn find(&self, canonical: &str) -> Option<usize> {
        self.by_canonical.get(canonical).copied()
    }
}

/// 解析目标骨骼对应的源骨骼索引
///
/// 目标骨骼名先经 `names` 转为规范名，再在源骨骼规范名索引中查找。
/// 返回 `None` 表示没有对应骨骼，调用方应保持该骨骼当前姿态不变。
pub fn resolve(target_bone: &str, names: &BoneNameMap, source: &SourceIndex) -> Option<usize> {
    source.find(names.canonical_name(target_bone))
}
