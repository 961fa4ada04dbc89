//! 骨骼遍历调度
//!
//! 根据骨骼真实的父子关系生成"父骨骼先于子骨骼"的访问顺序。
//! 重定向时每个骨骼都需要父骨骼本帧已更新的世界矩阵，因此顺序必须满足拓扑约束，
//! 不能依赖某个特定模型的骨骼数组排列。

use std::collections::VecDeque;

use crate::core::error::{SkeletonError, SkeletonResult};

use super::skeleton::Skeleton;

/// 父骨骼优先的遍历顺序
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalOrder {
    indices: Box<[usize]>,
}

impl TraversalOrder {
    /// 从父骨骼索引和子骨骼列表构建广度优先顺序
    ///
    /// 根骨骼按插入顺序依次作为起点。无法从任何根骨骼到达的骨骼
    /// 说明存在环，返回 `SkeletonError::Cycle`。
    pub fn build(
        names: &[String],
        parents: &[Option<usize>],
        children: &[Vec<usize>],
    ) -> SkeletonResult<Self> {
        let count = parents.len();
        let mut visited = vec![false; count];
        let mut indices = Vec::with_capacity(count);
        let mut queue = VecDeque::new();

        for (index, parent) in parents.iter().enumerate() {
            if parent.is_none() {
                visited[index] = true;
                queue.push_back(index);
            }
        }

        while let Some(index) = queue.pop_front() {
            indices.push(index);
            for &child in &children[index] {
                if !visited[child] {
                    visited[child] = true;
                    queue.push_back(child);
                }
            }
        }

        if let Some(orphan) = visited.iter().position(|v| !v) {
            return Err(SkeletonError::Cycle(names[orphan].clone()));
        }

        Ok(Self {
            indices: indices.into_boxed_slice(),
        })
    }

    /// 按顺序排列的骨骼索引
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// 检查顺序中每个骨骼都严格排在父骨骼之后
    pub fn is_parent_first(&self, parents: &[Option<usize>]) -> bool {
        let mut position = vec![usize::MAX; parents.len()];
        for (slot, &index) in self.indices.iter().enumerate() {
            match position.get_mut(index) {
                Some(p) if *p == usize::MAX => *p = slot,
                _ => return false,
            }
        }

        self.indices.iter().all(|&index| match parents[index] {
            Some(parent) => position[parent] < position[index],
            None => true,
        })
    }
}

/// 获取骨骼的父骨骼优先遍历顺序
///
/// 顺序在骨骼构建时计算一次，这里返回其副本，便于调用方长期缓存。
pub fn traversal_order(skeleton: &Skeleton) -> TraversalOrder {
    skeleton.traversal().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn children_of(parents: &[Option<usize>]) -> Vec<Vec<usize>> {
        let mut children = vec![Vec::new(); parents.len()];
        for (index, parent) in parents.iter().enumerate() {
            if let Some(p) = parent {
                children[*p].push(index);
            }
        }
        children
    }

    fn names_for(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("bone_{}", i)).collect()
    }

    #[test]
    fn test_order_with_parent_after_child_in_array() {
        // 数组中子骨骼排在父骨骼前面
        let parents = vec![Some(2), Some(0), None];
        let order =
            TraversalOrder::build(&names_for(3), &parents, &children_of(&parents)).unwrap();
        assert_eq!(order.as_slice(), &[2, 0, 1]);
        assert!(order.is_parent_first(&parents));
    }

    #[test]
    fn test_multiple_roots() {
        let parents = vec![None, None, Some(0), Some(1)];
        let order =
            TraversalOrder::build(&names_for(4), &parents, &children_of(&parents)).unwrap();
        assert_eq!(order.len(), 4);
        assert!(order.is_parent_first(&parents));
    }

    #[test]
    fn test_cycle_detected() {
        let parents = vec![None, Some(2), Some(1)];
        let result = TraversalOrder::build(&names_for(3), &parents, &children_of(&parents));
        assert!(matches!(result, Err(SkeletonError::Cycle(_))));
    }

    #[test]
    fn test_is_parent_first_rejects_bad_order() {
        let parents = vec![None, Some(0), Some(1)];
        let order = TraversalOrder {
            indices: vec![0, 2, 1].into_boxed_slice(),
        };
        assert!(!order.is_parent_first(&parents));
    }

    // 随机树：每个骨骼的父骨骼从之前生成的骨骼中选取，再打乱数组位置
    fn random_tree() -> impl Strategy<Value = Vec<Option<usize>>> {
        (1usize..64)
            .prop_flat_map(|count| {
                let parents = (0..count)
                    .map(|i| {
                        if i == 0 {
                            Just(None).boxed()
                        } else {
                            prop_oneof![
                                1 => Just(None::<usize>),
                                8 => (0..i).prop_map(Some),
                            ]
                            .boxed()
                        }
                    })
                    .collect::<Vec<_>>();
                (parents, Just(count).prop_perturb(|count, mut rng| {
                    let mut perm: Vec<usize> = (0..count).collect();
                    for i in (1..count).rev() {
                        let j = (rng.next_u32() as usize) % (i + 1);
                        perm.swap(i, j);
                    }
                    perm
                }))
            })
            .prop_map(|(parents, perm)| {
                // perm[i] 为原第 i 个骨骼在新数组中的位置
                let mut shuffled = vec![None; parents.len()];
                for (i, parent) in parents.iter().enumerate() {
                    shuffled[perm[i]] = parent.map(|p| perm[p]);
                }
                shuffled
            })
    }

    proptest! {
        #[test]
        fn traversal_never_visits_child_before_parent(parents in random_tree()) {
            let children = children_of(&parents);
            let order = TraversalOrder::build(&names_for(parents.len()), &parents, &children)
                .unwrap();
            prop_assert_eq!(order.len(), parents.len());
            prop_assert!(order.is_parent_first(&parents));
        }
    }
}
