//! 测试用的内存包缓存

use super::{Mark, PackageCache, PackageRecord};
use crate::error::CleanupError;
use anyhow::Result;

#[derive(Debug, Default)]
pub struct MemoryCache {
    pub packages: Vec<PackageRecord>,
    pub marks: Vec<Mark>,
    pub commits: usize,
}

impl MemoryCache {
    pub fn new(packages: Vec<PackageRecord>) -> Self {
        Self {
            packages,
            ..Default::default()
        }
    }

    /// 用 (包名, 版本) 构造全部已安装的缓存
    pub fn installed(packages: &[(&str, &str)]) -> Self {
        Self::new(
            packages
                .iter()
                .map(|(name, version)| PackageRecord::installed(name, version))
                .collect(),
        )
    }

    pub fn marked_names(&self) -> Vec<&str> {
        self.marks.iter().map(|m| m.name.as_str()).collect()
    }

    fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.iter().find(|p| p.name == name)
    }
}

impl PackageCache for MemoryCache {
    fn list_packages(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name.clone()).collect()
    }

    fn is_installed(&self, name: &str) -> bool {
        self.get(name).map(|p| p.installed).unwrap_or(false)
    }

    fn installed_version(&self, name: &str) -> Option<String> {
        self.get(name)
            .filter(|p| p.installed)
            .map(|p| p.raw_version.clone())
    }

    fn mark_delete(&mut self, name: &str, purge: bool) -> Result<()> {
        if self.get(name).is_none() {
            return Err(CleanupError::UnknownPackage(name.to_string()).into());
        }
        self.marks.push(Mark {
            name: name.to_string(),
            purge,
        });
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        Ok(())
    }
}
