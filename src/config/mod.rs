use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{ConfigError, ConfigResult};

/// 解析引擎配置
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ResolutionConfig {
    /// 祖先链上找不到时是否从根节点下行遍历整棵树
    pub walk_down: bool,
    /// 集合查询是否合并所有能解析的解析器的结果
    pub aggregate_collections: bool,
}

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "treevars".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub resolution: ResolutionConfig,
    pub log: LogConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.log.dir = Config::resolve_log_dir(&config.log.dir)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.log.level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "log.level",
                reason: "日志级别不能为空".to_string(),
            });
        }
        if self.log.file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "log.file",
                reason: "日志文件名不能为空".to_string(),
            });
        }
        if self.log.max_files == 0 {
            return Err(ConfigError::Invalid {
                field: "log.max_files",
                reason: "至少保留一个日志文件".to_string(),
            });
        }
        Ok(())
    }

    /// 展开以 `~` 开头的日志目录，其余路径原样保留
    fn resolve_log_dir(dir: &str) -> ConfigResult<String> {
        let Some(relative) = dir.strip_prefix('~') else {
            return Ok(dir.to_string());
        };
        let home = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::Invalid {
                field: "log.dir",
                reason: "无法获取用户主目录".to_string(),
            })?;
        let relative = relative.trim_start_matches(['/', '\\']);
        Ok(home.join(relative).to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.resolution.walk_down);
        assert!(!config.resolution.aggregate_collections);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.max_files, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_save() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");

        let mut config = Config::default();
        config.resolution.walk_down = true;
        config.log.level = "debug".to_string();
        config.save(temp_file.path()).expect("Failed to save config");

        let loaded_config =
            Config::load(temp_file.path()).expect("Failed to load config from temporary file");
        assert_eq!(config, loaded_config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        temp_file
            .write_all(b"[resolution]\naggregate_collections = true\n")
            .expect("Failed to write TOML content to temporary file");

        let config = Config::load(temp_file.path()).expect("Failed to load partial config");
        assert!(config.resolution.aggregate_collections);
        assert!(!config.resolution.walk_down);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.log.max_files = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "log.max_files", .. })
        ));

        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        temp_file
            .write_all(b"[log]\nlevel = \"\"\n")
            .expect("Failed to write TOML content to temporary file");
        assert!(matches!(
            Config::load(temp_file.path()),
            Err(ConfigError::Invalid { field: "log.level", .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        temp_file
            .write_all(b"[resolution\n")
            .expect("Failed to write TOML content to temporary file");
        assert!(matches!(Config::load(temp_file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_relative_log_dir_unchanged() {
        assert_eq!(Config::resolve_log_dir("logs").expect("resolve"), "logs");
    }
}
