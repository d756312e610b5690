//! 校验分类结果并标记待删除的包

use crate::classifier::ClassificationTable;
use crate::package_manager::PackageCache;
use anyhow::Result;

/// 校验后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    /// 去掉不一致包族后的分类表
    pub table: ClassificationTable,
    /// 已标记删除的包名，按族名顺序
    pub deletions: Vec<String>,
    /// 因 purge 非空但 current 为空而被跳过的包族
    pub skipped: Vec<String>,
}

/// 逐个包族校验并对 purge 组中的包调用 `mark_delete`
///
/// 某族有待删除的包却没有与运行内核匹配的包时，多半是内核版本识别有误，
/// 整族跳过，本次不删除任何包。不会调用 commit。
pub fn validate_and_mark<C: PackageCache + ?Sized>(
    mut table: ClassificationTable,
    cache: &mut C,
    purge: bool,
) -> Result<Validated> {
    let mut deletions = Vec::new();
    let mut skipped = Vec::new();

    let families: Vec<String> = table.keys().cloned().collect();
    for family in families {
        let Some(buckets) = table.get(&family) else {
            continue;
        };
        if buckets.current.is_empty() && !buckets.purge.is_empty() {
            log::warn!(
                "Skipping \"{}\": there are entries within \"purge\", but none within \"current\"!",
                family
            );
            table.remove(&family);
            skipped.push(family);
            continue;
        }
        for name in &buckets.purge {
            cache.mark_delete(name, purge)?;
            deletions.push(name.clone());
        }
    }

    Ok(Validated {
        table,
        deletions,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify, DEFAULT_FAMILIES};
    use crate::package_manager::memory::MemoryCache;
    use crate::package_manager::records;
    use crate::version::SimpleVersion;
    use pretty_assertions::assert_eq;

    fn run(kernel: &str, cache: &mut MemoryCache) -> Validated {
        let families: Vec<String> = DEFAULT_FAMILIES.iter().map(|f| f.to_string()).collect();
        let kernel = SimpleVersion::extract(kernel).unwrap();
        let table = classify(&kernel, &records(&*cache), &families);
        validate_and_mark(table, cache, true).unwrap()
    }

    #[test]
    fn purges_older_kernels_and_keeps_current_and_newest() {
        let mut cache = MemoryCache::installed(&[
            ("linux-image-5.4.0-40", "5.4.0-40"),
            ("linux-image-5.4.0-42", "5.4.0-42"),
            ("linux-image-5.4.0-45", "5.4.0-45"),
        ]);
        let validated = run("5.4.0-42", &mut cache);

        let image = &validated.table["linux-image"];
        assert_eq!(image.current, vec!["linux-image-5.4.0-42"]);
        assert_eq!(image.newest[0].name, "linux-image-5.4.0-45");
        assert_eq!(image.newest[0].version, "5.4.0-45");
        assert_eq!(image.purge, vec!["linux-image-5.4.0-40"]);
        assert_eq!(validated.deletions, vec!["linux-image-5.4.0-40"]);
        assert_eq!(cache.marked_names(), vec!["linux-image-5.4.0-40"]);
        assert!(cache.marks.iter().all(|m| m.purge));
        assert!(validated.skipped.is_empty());
        assert_eq!(cache.commits, 0);
    }

    #[test]
    fn family_without_current_is_dropped() {
        let mut cache = MemoryCache::installed(&[("linux-image-5.4.0-1", "5.4.0-1")]);
        let validated = run("5.5.0-1", &mut cache);

        assert!(validated.deletions.is_empty());
        assert!(validated.table.is_empty());
        assert_eq!(validated.skipped, vec!["linux-image"]);
        assert!(cache.marks.is_empty());
    }

    #[test]
    fn dropping_one_family_leaves_others_intact() {
        let mut cache = MemoryCache::installed(&[
            ("linux-headers-5.4.0-40", "5.4.0-40.44"),
            ("linux-image-5.4.0-40-generic", "5.4.0-40.44"),
            ("linux-image-5.4.0-42-generic", "5.4.0-42.46"),
        ]);
        let validated = run("5.4.0-42", &mut cache);

        assert_eq!(validated.skipped, vec!["linux-headers"]);
        assert_eq!(validated.deletions, vec!["linux-image-5.4.0-40-generic"]);
        assert_eq!(
            validated.table.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["linux-image"]
        );
    }

    #[test]
    fn family_with_only_newer_packages_is_kept() {
        let mut cache = MemoryCache::installed(&[("linux-image-5.4.0-45", "5.4.0-45")]);
        let validated = run("5.4.0-42", &mut cache);

        assert!(validated.skipped.is_empty());
        assert!(validated.deletions.is_empty());
        assert_eq!(validated.table.len(), 1);
    }

    #[test]
    fn demoted_newest_without_current_is_dropped() {
        let mut cache = MemoryCache::installed(&[
            ("linux-image-5.4.0-45", "5.4.0-45"),
            ("linux-image-5.4.0-48", "5.4.0-48"),
        ]);
        let validated = run("5.4.0-42", &mut cache);

        assert_eq!(validated.skipped, vec!["linux-image"]);
        assert!(validated.deletions.is_empty());
    }

    #[test]
    fn deletion_list_is_stable_across_runs() {
        let mut cache = MemoryCache::installed(&[
            ("linux-headers-5.4.0-40", "5.4.0-40.44"),
            ("linux-headers-5.4.0-42", "5.4.0-42.46"),
            ("linux-image-5.4.0-39-generic", "5.4.0-39.43"),
            ("linux-image-5.4.0-40-generic", "5.4.0-40.44"),
            ("linux-image-5.4.0-42-generic", "5.4.0-42.46"),
        ]);
        let listing = records(&cache);

        let first = run("5.4.0-42", &mut cache);
        let second = run("5.4.0-42", &mut cache);
        assert_eq!(first, second);
        assert_eq!(
            first.deletions,
            vec![
                "linux-headers-5.4.0-40",
                "linux-image-5.4.0-39-generic",
                "linux-image-5.4.0-40-generic",
            ]
        );
        assert_eq!(records(&cache), listing);
    }

    #[test]
    fn mark_failure_propagates() {
        let mut cache = MemoryCache::default();
        let kernel = SimpleVersion::extract("5.4.0-42").unwrap();
        let records = vec![
            crate::package_manager::PackageRecord::installed("linux-image-5.4.0-40", "5.4.0-40"),
            crate::package_manager::PackageRecord::installed("linux-image-5.4.0-42", "5.4.0-42"),
        ];
        let table = classify(&kernel, &records, &["linux-image".to_string()]);
        assert!(validate_and_mark(table, &mut cache, true).is_err());
    }
}
