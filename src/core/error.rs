//! 统一错误处理模块
//!
//! 提供重定向引擎范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **骨骼模型错误** (`SkeletonError`): 骨骼结构非法、父骨骼世界矩阵未就绪等
//! - **重定向错误** (`RetargetError`): 源骨骼未完成采样、计划与骨骼结构不匹配等
//! - **引擎错误** (`EngineError`): 汇总以上错误以及配置错误
//!
//! 缺失骨骼对应关系不是错误，重定向时直接跳过该骨骼。

use crate::config::ConfigError;
use thiserror::Error;

/// 引擎核心错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Skeleton error: {0}")]
    Skeleton(#[from] SkeletonError),

    #[error("Retarget error: {0}")]
    Retarget(#[from] RetargetError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// 骨骼模型错误
///
/// 结构类错误（`Empty`、`InvalidParent`、`Cycle` 等）在构建骨骼时返回；
/// `StaleParent` 表示遍历顺序有误：父骨骼的世界矩阵在本帧尚未计算。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    #[error("Skeleton has no bones")]
    Empty,

    #[error("Bone '{bone}' references parent index {parent} which does not exist")]
    InvalidParent { bone: String, parent: usize },

    #[error("Bone '{0}' is its own parent")]
    SelfParent(String),

    #[error("Bone '{0}' is part of a cycle or unreachable from any root")]
    Cycle(String),

    #[error("Duplicate bone name: {0}")]
    DuplicateName(String),

    #[error("Bone index out of range: {0}")]
    BoneOutOfRange(usize),

    #[error("World transform of parent '{parent}' is stale while updating bone '{bone}'")]
    StaleParent { bone: String, parent: String },
}

/// 重定向错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetargetError {
    #[error("Skeleton error: {0}")]
    Skeleton(#[from] SkeletonError),

    #[error("Source bone '{bone}' has a stale world transform; finalize the source pose before retargeting")]
    SourceNotFinalized { bone: String },

    #[error("Retarget plan was built for {expected} bones, skeleton has {actual}")]
    PlanMismatch { expected: usize, actual: usize },

    #[error("Retarget plan does not match the {skeleton} skeleton layout at bone '{bone}'")]
    LayoutMismatch { skeleton: &'static str, bone: String },

    #[error("Invalid retarget options: {0}")]
    InvalidOptions(String),
}

/// 引擎结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
pub type SkeletonResult<T> = Result<T, SkeletonError>;
pub type RetargetResult<T> = Result<T, RetargetError>;
