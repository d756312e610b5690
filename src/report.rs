use crate::classifier::{Bucket, ClassificationTable};
use crate::validator::Validated;
use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::PathBuf;

/// 将分类表渲染为文本：族名、分组（缩进 4）、包名（缩进 8），末尾空行
pub fn render_table(table: &ClassificationTable) -> String {
    let mut out = String::new();

    for (family, buckets) in table {
        out.push_str(family);
        out.push('\n');
        for bucket in Bucket::ALL {
            let mut names = buckets.names(bucket);
            if names.is_empty() {
                continue;
            }
            names.sort_unstable();
            out.push_str(&format!("{:4}{}\n", "", bucket));
            for name in names {
                out.push_str(&format!("{:8}{}\n", "", name));
            }
        }
    }
    out.push('\n');

    out
}

/// 本次运行对已标记包的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitStatus {
    DryRun,
    Committed,
    Failed(String),
}

impl CommitStatus {
    fn mode(&self) -> String {
        match self {
            CommitStatus::DryRun => "dry run".to_string(),
            CommitStatus::Committed => "commit".to_string(),
            CommitStatus::Failed(err) => format!("commit failed: {}", err),
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            CommitStatus::DryRun => "would remove:",
            CommitStatus::Committed => "removed:",
            CommitStatus::Failed(_) => "marked for removal (not removed):",
        }
    }
}

pub struct ReportSaver {
    base_dir: PathBuf,
}

impl ReportSaver {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// 保存到 `<base_dir>/YYYY/MM/DD/HH-MM.txt`
    pub fn save(
        &self,
        summary: &str,
        validated: &Validated,
        status: &CommitStatus,
    ) -> Result<PathBuf> {
        let now = Local::now();

        let dir = self
            .base_dir
            .join(now.format("%Y").to_string())
            .join(now.format("%m").to_string())
            .join(now.format("%d").to_string());
        fs::create_dir_all(&dir)?;

        let filepath = dir.join(now.format("%H-%M.txt").to_string());

        let mut content = String::new();
        content.push_str(&format!(
            "kernel-cleanup report\ngenerated: {}\nmode: {}\n\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            status.mode()
        ));
        content.push_str(summary);
        if !validated.skipped.is_empty() {
            content.push_str("skipped (purge without current):\n");
            for family in &validated.skipped {
                content.push_str(&format!("{:4}{}\n", "", family));
            }
        }
        if validated.deletions.is_empty() {
            content.push_str("nothing to remove\n");
        } else {
            content.push_str(status.heading());
            content.push('\n');
            for name in &validated.deletions {
                content.push_str(&format!("{:4}{}\n", "", name));
            }
        }

        fs::write(&filepath, content)?;

        Ok(filepath)
    }
}
