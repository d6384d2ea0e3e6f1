//! 表格分类流程 - 流程层
//!
//! 对目录列表中的每个条目依次执行：过滤 → 校验 → 文件名分类 → 插入映射

use crate::error::TableError;
use crate::models::{CategoryMap, FaultyTables, TableFile, TableListing};
use crate::services::{classify, TableCheck};
use std::path::Path;
use tracing::{debug, warn};

/// 表格文件扩展名
pub const SPREADSHEET_EXTENSION: &str = ".xlsx";

/// 文件系统自动生成、需要忽略的文件
pub const SENTINEL_NAMES: &[&str] = &[".DS_Store"];

/// 分类结果
///
/// 每个候选文件恰好出现在 `tables` 或 `faulty` 之一中；
/// `map` 中同一 (学校, 年级, 班级) 只保留排序靠后的文件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categorization {
    pub map: CategoryMap,
    pub faulty: FaultyTables,
    /// 通过校验和分类的表格，保持输入顺序
    pub tables: Vec<TableFile>,
}

/// 是否是需要处理的表格文件名
pub fn is_candidate(name: &str) -> bool {
    !SENTINEL_NAMES.contains(&name) && name.ends_with(SPREADSHEET_EXTENSION)
}

/// 表格分类器
pub struct Categorizer<'a, V: TableCheck> {
    validator: &'a V,
}

impl<'a, V: TableCheck> Categorizer<'a, V> {
    pub fn new(validator: &'a V) -> Self {
        Self { validator }
    }

    /// 对目录列表分类：文件名不是 UTF-8 的候选文件直接记为 faulty，其余交给 [`Self::categorize`]
    pub fn categorize_listing(&self, dir: &Path, listing: &TableListing) -> Categorization {
        let mut result = self.categorize(dir, &listing.names);
        for name in listing.undecodable.iter().filter(|name| is_candidate(name)) {
            let err = TableError::NonUtf8Name { name: name.clone() };
            warn!("表格 {} 无法分类: {}", name, err);
            result.faulty.record(name.as_str(), err.to_string());
        }
        result
    }

    /// 对已排序的目录列表分类
    ///
    /// # 参数
    /// - `dir`: 表格所在目录
    /// - `names`: 目录中的条目名，按字典序排序；顺序决定覆盖顺序
    ///
    /// # 返回
    /// 返回本次调用新建的分类结果，不依赖任何全局状态
    pub fn categorize(&self, dir: &Path, names: &[String]) -> Categorization {
        let mut result = Categorization::default();

        for name in names.iter().filter(|name| is_candidate(name)) {
            let path = dir.join(name);

            if let Err(e) = self.validator.check(&path) {
                result.faulty.record(name.as_str(), e.to_string());
                continue;
            }

            match classify(name) {
                Ok(info) => {
                    if let Some(previous) = result.map.insert(&info, name.as_str()) {
                        debug!("{} 覆盖了 {}", name, previous);
                    }
                    result.tables.push(TableFile::new(name.clone(), path, info));
                }
                Err(e) => {
                    warn!("表格 {} 无法分类: {}", name, e);
                    result.faulty.record(name.as_str(), e.to_string());
                }
            }
        }

        result
    }
}
