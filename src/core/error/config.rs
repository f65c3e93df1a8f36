//! 配置错误类型

use thiserror::Error;

/// 配置操作结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置解析失败: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("配置序列化失败: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("无效的配置项 {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
