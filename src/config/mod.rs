//! 统一配置系统
//!
//! 提供TOML/JSON配置文件、环境变量覆盖，并构建重定向选项
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod retarget;

pub use retarget::{RetargetSettings, RotationConfig};

use crate::impl_default;
use crate::retarget::{BoneNameMap, RetargetOptions};

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 重定向主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetargetConfig {
    /// 重定向行为
    #[serde(default)]
    pub retarget: RetargetSettings,

    /// 目标骨骼名称 → 规范名
    #[serde(default)]
    pub bone_map: BTreeMap<String, String>,

    /// 源骨骼名称 → 规范名（源骨骼已使用规范名时省略）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_bone_map: Option<BTreeMap<String, String>>,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RetargetConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("RETARGET_PRESERVE_ROOT_POSITION") {
            self.retarget.preserve_root_position =
                val.parse().unwrap_or(self.retarget.preserve_root_position);
        }
        if let Ok(val) = env::var("RETARGET_USE_WORLD_MATRIX") {
            self.retarget.use_target_world_matrix =
                val.parse().unwrap_or(self.retarget.use_target_world_matrix);
        }
        if let Ok(val) = env::var("RETARGET_HIP") {
            if !val.trim().is_empty() {
                self.retarget.hip = val.trim().to_string();
            }
        }
        if let Ok(val) = env::var("RETARGET_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.retarget.validate()?;
        for (bone, canonical) in self
            .bone_map
            .iter()
            .chain(self.source_bone_map.iter().flatten())
        {
            if bone.is_empty() || canonical.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Empty bone name in mapping '{}' -> '{}'",
                    bone, canonical
                )));
            }
        }
        Ok(())
    }

    /// 目标骨骼名称映射
    pub fn bone_name_map(&self) -> BoneNameMap {
        self.bone_map.iter().collect()
    }

    /// 源骨骼名称映射
    pub fn source_bone_name_map(&self) -> Option<BoneNameMap> {
        self.source_bone_map
            .as_ref()
            .map(|map| map.iter().collect())
    }

    /// 构建不可变的重定向选项
    pub fn to_options(&self) -> ConfigResult<RetargetOptions> {
        self.validate()?;
        self.retarget
            .to_options(self.bone_name_map(), self.source_bone_name_map())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./retarget.toml
    /// 2. ./retarget.json
    /// 3. ~/.config/retarget_engine/retarget.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("retarget.toml") {
            tracing::info!(target: "config", "Loaded config from retarget.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("retarget.json") {
            tracing::info!(target: "config", "Loaded config from retarget.json");
            return config;
        }

        if let Some(home) = env::var_os("HOME") {
            let config_path = PathBuf::from(home)
                .join(".config")
                .join("retarget_engine")
                .join("retarget.toml");

            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::info!(target: "config", "Loaded config from {:?}", config_path);
                return config;
            }
        }

        tracing::warn!(target: "config", "No config file found, using default configuration");
        Self::default()
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 解析日志级别（不区分大小写）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}
