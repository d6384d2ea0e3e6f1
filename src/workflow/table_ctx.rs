//! 表格处理上下文
//!
//! 封装"我正在处理第几个表格"这一信息

use std::fmt::Display;

/// 表格处理上下文（仅用于日志显示）
#[derive(Debug, Clone)]
pub struct TableCtx {
    /// 表格序号（从1开始）
    pub table_index: usize,

    /// 本次运行待处理的表格总数
    pub total: usize,

    /// 文件名
    pub name: String,
}

impl TableCtx {
    pub fn new(table_index: usize, total: usize, name: impl Into<String>) -> Self {
        Self {
            table_index,
            total,
            name: name.into(),
        }
    }
}

impl Display for TableCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[表格 {}/{}]", self.table_index, self.total)
    }
}
