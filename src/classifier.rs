//! 内核包分类：按包族分为 current / newest / purge 三组

use crate::package_manager::PackageRecord;
use crate::version::{compare_versions, SimpleVersion};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// 包名去掉版本后缀后的族名，如 `linux-image-5.4.0-42-generic` -> `linux-image`
static RE_SIMPLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^0-9]+)-[0-9]").expect("valid family pattern"));

pub const DEFAULT_FAMILIES: &[&str] = &["linux-headers", "linux-image", "linux-image-extra"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    Current,
    Newest,
    Purge,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Current, Bucket::Newest, Bucket::Purge];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Current => "current",
            Bucket::Newest => "newest",
            Bucket::Purge => "purge",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// newest 组的条目：保留完整版本号，newest 不一定等于运行中的内核版本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewestEntry {
    pub name: String,
    pub version: String,
}

/// 单个包族的分类结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyBuckets {
    pub current: Vec<String>,
    pub newest: Vec<NewestEntry>,
    pub purge: Vec<String>,
}

impl FamilyBuckets {
    /// 指定分组下的包名
    pub fn names(&self, bucket: Bucket) -> Vec<&str> {
        match bucket {
            Bucket::Current => self.current.iter().map(String::as_str).collect(),
            Bucket::Newest => self.newest.iter().map(|e| e.name.as_str()).collect(),
            Bucket::Purge => self.purge.iter().map(String::as_str).collect(),
        }
    }

    /// 比内核新的候选包：只保留版本最大的一批，其余进入 purge
    fn offer_newest(&mut self, name: &str, version: &str) {
        if self.newest.iter().any(|e| e.name == name) {
            return;
        }

        // newest 中的条目版本相同，与第一个比较即可
        let ordering = self
            .newest
            .first()
            .map(|best| compare_versions(version, &best.version));

        match ordering {
            None | Some(Ordering::Equal) => {}
            Some(Ordering::Greater) => {
                let demoted = self.newest.drain(..).map(|e| e.name);
                self.purge.extend(demoted);
            }
            Some(Ordering::Less) => {
                self.purge.push(name.to_string());
                return;
            }
        }

        self.newest.push(NewestEntry {
            name: name.to_string(),
            version: version.to_string(),
        });
    }
}

/// 包族 -> 分类结果，按族名排序
pub type ClassificationTable = BTreeMap<String, FamilyBuckets>;

/// 从包名提取族名
pub fn family_of(name: &str) -> Option<&str> {
    RE_SIMPLE_NAME
        .captures(name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// 将已安装的内核相关包与运行中的内核版本比较并分类
///
/// 未安装、族名不在 `families` 中或版本无法解析的包都会被跳过。
pub fn classify(
    kernel: &SimpleVersion,
    packages: &[PackageRecord],
    families: &[String],
) -> ClassificationTable {
    let mut table = ClassificationTable::new();

    for package in packages {
        let Some(family) = family_of(&package.name) else {
            continue;
        };
        if !families.iter().any(|f| f == family) {
            continue;
        }
        if !package.installed {
            continue;
        }
        let Some(version) = SimpleVersion::extract(&package.raw_version) else {
            log::debug!(
                "跳过 {}: 无法解析版本 {:?}",
                package.name,
                package.raw_version
            );
            continue;
        };

        let buckets = table.entry(family.to_string()).or_default();
        match kernel.cmp(&version) {
            Ordering::Equal => buckets.current.push(package.name.clone()),
            Ordering::Greater => buckets.purge.push(package.name.clone()),
            Ordering::Less => buckets.offer_newest(&package.name, &package.raw_version),
        }
    }

    table
}
