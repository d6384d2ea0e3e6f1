use crate::error::{TableError, TableResult};
use std::path::Path;

/// 表格目录的列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableListing {
    /// 所有 UTF-8 条目名，按字典序排序
    pub names: Vec<String>,
    /// 不是有效 UTF-8 的条目名（有损转换后），按字典序排序
    pub undecodable: Vec<String>,
}

/// 列出目录中的所有条目名，按字典序排序
///
/// 不做任何过滤；排序决定了分类时同名覆盖的顺序以及后续处理顺序。
/// 文件名不是 UTF-8 的条目单独列出，无法按文件名规则分类
pub fn list_table_names(dir: &Path) -> TableResult<TableListing> {
    let entries = std::fs::read_dir(dir).map_err(|e| TableError::io(dir, e))?;

    let mut listing = TableListing::default();
    for entry in entries {
        let entry = entry.map_err(|e| TableError::io(dir, e))?;
        match entry.file_name().into_string() {
            Ok(name) => listing.names.push(name),
            Err(raw) => listing.undecodable.push(raw.to_string_lossy().into_owned()),
        }
    }
    listing.names.sort();
    listing.undecodable.sort();

    tracing::debug!(
        "目录 {} 中共有 {} 个条目（{} 个文件名不是 UTF-8）",
        dir.display(),
        listing.names.len() + listing.undecodable.len(),
        listing.undecodable.len()
    );
    Ok(listing)
}
