//! PackageManager 相关数据类型定义

/// 一条包记录（来自 dpkg 数据库快照）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    /// 包管理器原生版本号，如 `5.4.0-42.46`
    pub raw_version: String,
    pub installed: bool,
}

#[cfg(test)]
impl PackageRecord {
    pub fn installed(name: &str, raw_version: &str) -> Self {
        Self {
            name: name.to_string(),
            raw_version: raw_version.to_string(),
            installed: true,
        }
    }
}
