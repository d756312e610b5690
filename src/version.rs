//! Debian 版本号比较与简化版本提取

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

/// 形如 `5.4.0-42` 的简化版本，从内核 release 或包版本开头截取
static RE_SIMPLE_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\d.]+-\d+)").expect("valid simple version pattern"));

/// 简化版本号（`<数字与点>-<数字>`）
#[derive(Debug, Clone)]
pub struct SimpleVersion(String);

impl SimpleVersion {
    /// 从原始版本字符串开头提取简化版本，不匹配时返回 None
    pub fn extract(raw: &str) -> Option<Self> {
        RE_SIMPLE_VERSION
            .captures(raw.trim())
            .and_then(|c| c.get(1))
            .map(|m| SimpleVersion(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SimpleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for SimpleVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimpleVersion {}

impl Ord for SimpleVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_versions(&self.0, &other.0)
    }
}

impl PartialOrd for SimpleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 按 dpkg 语义比较两个版本号：epoch、upstream、revision 依次比较
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a_epoch, a_upstream, a_revision) = split_version(a);
    let (b_epoch, b_upstream, b_revision) = split_version(b);

    a_epoch
        .cmp(&b_epoch)
        .then_with(|| verrevcmp(a_upstream, b_upstream))
        .then_with(|| verrevcmp(a_revision, b_revision))
}

/// 拆分为 (epoch, upstream, revision)
///
/// epoch 只在第一个 `:` 之前全为数字时生效；revision 取最后一个 `-` 之后的部分。
fn split_version(version: &str) -> (u64, &str, &str) {
    let version = version.trim();

    let (epoch, rest) = match version.split_once(':') {
        Some((e, rest)) if !e.is_empty() && e.bytes().all(|b| b.is_ascii_digit()) => {
            (e.parse().unwrap_or(u64::MAX), rest)
        }
        _ => (0, version),
    };

    match rest.rfind('-') {
        Some(pos) => (epoch, &rest[..pos], &rest[pos + 1..]),
        None => (epoch, rest, ""),
    }
}

/// 非数字段中单个字符的排序权重
///
/// `~` 排在一切之前（包括字符串结尾），字母排在其他符号之前。
fn order(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => c as i32,
        Some(b'~') => -1,
        Some(c) => c as i32 + 256,
    }
}

fn verrevcmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        // 非数字段逐字符比较
        while (i < a.len() && !a[i].is_ascii_digit()) || (j < b.len() && !b[j].is_ascii_digit()) {
            let ac = order(a.get(i).copied());
            let bc = order(b.get(j).copied());
            if ac != bc {
                return ac.cmp(&bc);
            }
            i += 1;
            j += 1;
        }

        // 数字段按数值比较：跳过前导零后先比长度再比字典序
        while i < a.len() && a[i] == b'0' {
            i += 1;
        }
        while j < b.len() && b[j] == b'0' {
            j += 1;
        }
        let a_start = i;
        while i < a.len() && a[i].is_ascii_digit() {
            i += 1;
        }
        let b_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        let a_digits = &a[a_start..i];
        let b_digits = &b[b_start..j];
        let ord = a_digits
            .len()
            .cmp(&b_digits.len())
            .then_with(|| a_digits.cmp(b_digits));
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}
