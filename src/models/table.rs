use std::fmt::Display;
use std::path::PathBuf;

/// 从文件名中解析出的分类信息（学校、年级、班级）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableInfo {
    /// 学校标识，文件名第一个 `_` 之前的字母数字
    pub school_id: String,
    /// 年级，一位数字
    pub year: char,
    /// 班级，一个字母
    pub group: char,
}

impl Display for TableInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[学校 {} 年级 {} 班级 {}]", self.school_id, self.year, self.group)
    }
}

/// 磁盘上一个已通过校验和分类的表格
///
/// 只读输入；标注时生成的是副本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFile {
    /// 文件名（不含目录）
    pub name: String,
    /// 完整路径
    pub path: PathBuf,
    pub info: TableInfo,
}

impl TableFile {
    pub fn new(name: String, path: PathBuf, info: TableInfo) -> Self {
        Self { name, path, info }
    }
}
