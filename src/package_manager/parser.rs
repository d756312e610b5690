//! 输出解析函数

use super::types::PackageRecord;

/// dpkg-query 的输出格式：包名、状态、版本，以制表符分隔
pub const DPKG_QUERY_FORMAT: &str = "${Package}\t${Status}\t${Version}\n";

/// 解析 `dpkg-query -W -f=DPKG_QUERY_FORMAT` 的输出
///
/// 状态字段形如 `install ok installed`，最后一个词为 `installed` 才算已安装。
/// 字段不足的行直接跳过。
pub fn parse_dpkg_query(output: &str) -> Vec<PackageRecord> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let name = fields.next()?.trim();
            let status = fields.next()?;
            let version = fields.next().unwrap_or("").trim();
            if name.is_empty() {
                return None;
            }
            Some(PackageRecord {
                name: name.to_string(),
                raw_version: version.to_string(),
                installed: status.split_whitespace().last() == Some("installed"),
            })
        })
        .collect()
}
