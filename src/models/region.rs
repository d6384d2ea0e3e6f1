//! 学生数据区域模板
//!
//! 表格从 `header_row` 行开始逐行存放学生数据，`id_column` 为学号列。
//! 四个评分周期（1、2、3 和期末）各占一个列块，列块由同一个模板按固定间隔平移生成：
//!
//! ```text
//! 偏移 +0  average            平均分，范围检查
//! 偏移 +1  approval_fraction  通过比例，只接受 1/1 ... 10/10 或空
//! 偏移 +2  present_flag       出勤确认，有缺勤原因时必须为 yes_token
//! 偏移 +3  absence_reason     缺勤原因
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// 列块内各列的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnRole {
    Average,
    ApprovalFraction,
    PresentFlag,
    AbsenceReason,
}

impl ColumnRole {
    /// 相对于列块起始列的偏移
    pub fn offset(self) -> u16 {
        match self {
            ColumnRole::Average => 0,
            ColumnRole::ApprovalFraction => 1,
            ColumnRole::PresentFlag => 2,
            ColumnRole::AbsenceReason => 3,
        }
    }
}

/// 可配置的区域模板（1 起始行号、列字母）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationRegion {
    /// 学生数据起始行（1 起始）
    pub header_row: u32,
    /// 学号列
    pub id_column: String,
    /// 第一个周期列块的起始列
    pub first_block_column: String,
    /// 相邻列块之间的列数
    pub block_stride: u16,
    /// 出勤确认的"是"
    pub yes_token: String,
    /// 各周期名称，数量即列块数量
    pub periods: Vec<String>,
}

impl Default for AnnotationRegion {
    fn default() -> Self {
        Self {
            header_row: 13,
            id_column: "A".to_string(),
            first_block_column: "E".to_string(),
            block_stride: 4,
            yes_token: "SI".to_string(),
            periods: vec![
                "1".to_string(),
                "2".to_string(),
                "3".to_string(),
                "Final".to_string(),
            ],
        }
    }
}

impl AnnotationRegion {
    /// 把模板展开为 0 起始的行列坐标
    pub fn layout(&self) -> Result<RegionLayout, ConfigError> {
        if self.header_row == 0 {
            return Err(ConfigError::InvalidHeaderRow(self.header_row));
        }
        let id_column = column_index(&self.id_column)?;
        let first = column_index(&self.first_block_column)?;

        let blocks = self
            .periods
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let base = u16::try_from(i)
                    .ok()
                    .and_then(|i| i.checked_mul(self.block_stride))
                    .and_then(|offset| first.checked_add(offset))
                    .filter(|base| base.checked_add(ColumnRole::AbsenceReason.offset()).is_some())
                    .ok_or_else(|| ConfigError::InvalidColumn(format!("{} + {}", self.first_block_column, i)))?;
                Ok(PeriodBlock::from_template(label, base))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(RegionLayout {
            first_row: self.header_row - 1,
            id_column,
            yes_token: self.yes_token.clone(),
            blocks,
        })
    }
}

/// 一个评分周期的列块（0 起始列号）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBlock {
    pub label: String,
    pub average: u16,
    pub approval_fraction: u16,
    pub present_flag: u16,
    pub absence_reason: u16,
}

impl PeriodBlock {
    pub fn from_template(label: impl Into<String>, base: u16) -> Self {
        Self {
            label: label.into(),
            average: base + ColumnRole::Average.offset(),
            approval_fraction: base + ColumnRole::ApprovalFraction.offset(),
            present_flag: base + ColumnRole::PresentFlag.offset(),
            absence_reason: base + ColumnRole::AbsenceReason.offset(),
        }
    }
}

/// 展开后的区域（0 起始）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionLayout {
    pub first_row: u32,
    pub id_column: u16,
    pub yes_token: String,
    pub blocks: Vec<PeriodBlock>,
}

impl Default for RegionLayout {
    fn default() -> Self {
        let region = AnnotationRegion::default();
        Self {
            first_row: region.header_row - 1,
            id_column: 0,
            yes_token: region.yes_token,
            blocks: region
                .periods
                .iter()
                .enumerate()
                .map(|(i, label)| PeriodBlock::from_template(label, 4 + 4 * i as u16))
                .collect(),
        }
    }
}

/// 列字母转 0 起始列号：A → 0, Z → 25, AA → 26
pub fn column_index(letters: &str) -> Result<u16, ConfigError> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::InvalidColumn(letters.to_string()));
    }

    let mut index: u32 = 0;
    for c in letters.chars() {
        let digit = u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1;
        index = index * 26 + digit;
        // Excel 最大列 XFD = 16384
        if index > 16_384 {
            return Err(ConfigError::InvalidColumn(letters.to_string()));
        }
    }
    u16::try_from(index - 1).map_err(|_| ConfigError::InvalidColumn(letters.to_string()))
}

/// 0 起始列号转列字母
pub fn column_name(index: u16) -> String {
    let mut n = u32::from(index) + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        name.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    name.iter().rev().collect()
}
