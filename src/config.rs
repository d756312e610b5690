use crate::classifier::DEFAULT_FAMILIES;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 参与比较的包族
    pub families: Vec<String>,
    /// 标记删除时是否连同配置文件一起清除
    pub purge: bool,
    pub dpkg_query: String,
    pub apt_get: String,
    pub report_dir: PathBuf,
    pub save_report: bool,
}

impl Default for Config {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self {
            families: DEFAULT_FAMILIES.iter().map(|f| f.to_string()).collect(),
            purge: true,
            dpkg_query: "dpkg-query".to_string(),
            apt_get: "apt-get".to_string(),
            report_dir: PathBuf::from(home).join(".kernel-cleanup/reports"),
            save_report: false,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/kernel-cleanup/config.toml")
    }

    /// 默认路径下没有配置文件时使用默认值
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_path();

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config '{}'", path.display()))?;
        Ok(config)
    }
}
