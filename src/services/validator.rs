//! 表格校验服务 - 业务能力层
//!
//! 只回答"这个文件能不能按表格打开"

use crate::error::TableResult;
use crate::infrastructure;
use std::path::Path;
use tracing::warn;

/// 表格校验能力
///
/// 分类流程依赖这个 trait，测试中可以替换为不读文件的实现
pub trait TableCheck {
    /// 文件结构可读时返回 `Ok(())`，否则返回可恢复的 `Parse`/`EmptyWorkbook` 错误
    fn check(&self, path: &Path) -> TableResult<()>;

    fn is_valid(&self, path: &Path) -> bool {
        self.check(path).is_ok()
    }
}

/// 用 calamine 打开工作簿进行校验
#[derive(Debug, Default, Clone, Copy)]
pub struct TableValidator;

impl TableValidator {
    pub fn new() -> Self {
        Self
    }
}

impl TableCheck for TableValidator {
    fn check(&self, path: &Path) -> TableResult<()> {
        infrastructure::check_readable(path).inspect_err(|e| {
            warn!("表格 {} 似乎已损坏: {}", path.display(), e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn test_is_valid() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join(r#"E1_a "1A".xlsx"#);
        let broken = dir.path().join(r#"E1_b "1B".xlsx"#);

        let mut workbook = Workbook::new();
        workbook.add_worksheet().write_number(12, 0, 1).unwrap();
        workbook.save(&good).unwrap();
        std::fs::write(&broken, "no es un libro").unwrap();

        let validator = TableValidator::new();
        assert!(validator.is_valid(&good));
        assert!(!validator.is_valid(&broken));
        assert!(!validator.is_valid(&dir.path().join("no_existe.xlsx")));
    }
}
