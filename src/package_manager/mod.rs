//! 包管理器模块 — 对 dpkg-query / apt-get 的封装

pub mod parser;
pub mod types;

#[cfg(test)]
pub mod memory;

pub use types::PackageRecord;

use crate::error::CleanupError;
use anyhow::Result;
use parser::{parse_dpkg_query, DPKG_QUERY_FORMAT};
use std::collections::BTreeMap;

/// 包缓存抽象：查询已安装包、标记删除、提交
pub trait PackageCache {
    /// 缓存中全部包名
    fn list_packages(&self) -> Vec<String>;

    fn is_installed(&self, name: &str) -> bool;

    /// 已安装版本，未安装时为 None
    fn installed_version(&self, name: &str) -> Option<String>;

    /// 仅标记，不做实际删除；`purge` 为 true 时连同配置文件一起清除
    fn mark_delete(&mut self, name: &str, purge: bool) -> Result<()>;

    /// 执行所有已标记的操作
    fn commit(&mut self) -> Result<()>;
}

/// 从缓存生成包记录列表
pub fn records<C: PackageCache + ?Sized>(cache: &C) -> Vec<PackageRecord> {
    cache
        .list_packages()
        .into_iter()
        .map(|name| {
            let installed = cache.is_installed(&name);
            let raw_version = cache.installed_version(&name).unwrap_or_default();
            PackageRecord {
                name,
                raw_version,
                installed,
            }
        })
        .collect()
}

/// 一次删除标记
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub name: String,
    pub purge: bool,
}

/// 基于 dpkg 数据库快照的 apt 缓存
#[derive(Debug)]
pub struct AptCache {
    apt_get: String,
    packages: BTreeMap<String, PackageRecord>,
    marks: Vec<Mark>,
    quiet: bool,
}

impl AptCache {
    /// 读取 dpkg 数据库，建立快照
    pub fn open(dpkg_query: &str, apt_get: &str) -> Result<Self> {
        let format = format!("-f={}", DPKG_QUERY_FORMAT);
        let output = duct::cmd(dpkg_query, ["-W", format.as_str()])
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()?;
        if !output.status.success() {
            return Err(CleanupError::Query {
                command: format!("{} -W", dpkg_query),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let records = parse_dpkg_query(&String::from_utf8_lossy(&output.stdout));
        log::debug!("dpkg-query: {} 条包记录", records.len());
        Ok(Self::from_records(apt_get, records))
    }

    /// 同名记录（multi-arch）只保留一条，已安装的优先
    pub fn from_records(apt_get: &str, records: Vec<PackageRecord>) -> Self {
        let mut packages: BTreeMap<String, PackageRecord> = BTreeMap::new();
        for record in records {
            match packages.get(&record.name) {
                Some(existing) if existing.installed || !record.installed => {}
                _ => {
                    packages.insert(record.name.clone(), record);
                }
            }
        }

        Self {
            apt_get: apt_get.to_string(),
            packages,
            marks: Vec::new(),
            quiet: false,
        }
    }

    /// 静默模式下提交时丢弃 apt-get 的 stdout / stderr
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    #[cfg(test)]
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// 按标记生成 apt-get 参数，purge 与 remove 分两次执行
    fn commit_args(&self) -> Vec<Vec<String>> {
        let mut batches = Vec::new();
        for (action, purge) in [("purge", true), ("remove", false)] {
            let names: Vec<String> = self
                .marks
                .iter()
                .filter(|m| m.purge == purge)
                .map(|m| m.name.clone())
                .collect();
            if names.is_empty() {
                continue;
            }
            let mut args = vec!["-y".to_string(), action.to_string()];
            args.extend(names);
            batches.push(args);
        }
        batches
    }
}

impl PackageCache for AptCache {
    fn list_packages(&self) -> Vec<String> {
        self.packages.keys().cloned().collect()
    }

    fn is_installed(&self, name: &str) -> bool {
        self.packages.get(name).map(|p| p.installed).unwrap_or(false)
    }

    fn installed_version(&self, name: &str) -> Option<String> {
        self.packages
            .get(name)
            .filter(|p| p.installed)
            .map(|p| p.raw_version.clone())
    }

    fn mark_delete(&mut self, name: &str, purge: bool) -> Result<()> {
        if !self.packages.contains_key(name) {
            return Err(CleanupError::UnknownPackage(name.to_string()).into());
        }
        if self.marks.iter().any(|m| m.name == name) {
            return Ok(());
        }
        log::info!("标记删除: {} (purge={})", name, purge);
        self.marks.push(Mark {
            name: name.to_string(),
            purge,
        });
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        for args in self.commit_args() {
            log::info!("{} {}", self.apt_get, args.join(" "));
            let mut expr = duct::cmd(&self.apt_get, &args)
                .env("DEBIAN_FRONTEND", "noninteractive")
                .unchecked();
            if self.quiet {
                expr = expr.stdout_null().stderr_null();
            }
            let output = expr.run()?;
            if !output.status.success() {
                return Err(CleanupError::Commit {
                    command: format!("{} {}", self.apt_get, args.join(" ")),
                    code: output.status.code(),
                }
                .into());
            }
        }
        self.marks.clear();
        Ok(())
    }
}
