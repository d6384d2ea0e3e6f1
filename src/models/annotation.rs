//! 单个表格的标注结果

use crate::models::highlight::HighlightRange;
use serde::Serialize;
use std::collections::HashSet;

/// 单元格被高亮的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HighlightRule {
    /// 平均分落在 [min, max] 内
    AverageInRange,
    /// 通过比例不是 空 / 1/1 ... 10/10
    MalformedFraction,
    /// 填写了缺勤原因但没有出勤确认
    MissingPresentFlag,
}

/// 一个需要高亮的单元格（0 起始坐标）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkedCell {
    pub row: u32,
    pub col: u16,
    pub period: String,
    pub rule: HighlightRule,
}

/// 一列中连续的行区间，用于附加条件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpan {
    pub col: u16,
    pub first_row: u32,
    pub last_row: u32,
}

/// 标注结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationReport {
    /// 学生行数
    pub pupil_count: u32,
    /// 所有需要填充颜色的单元格
    pub marks: Vec<MarkedCell>,
    /// 平均分列的条件格式区间；空范围或没有学生时为空
    pub average_spans: Vec<ColumnSpan>,
    #[serde(skip)]
    pub bounds: HighlightRange,
}

impl AnnotationReport {
    pub fn count(&self, rule: HighlightRule) -> usize {
        self.marks.iter().filter(|m| m.rule == rule).count()
    }

    pub fn is_marked(&self, row: u32, col: u16) -> bool {
        self.marks.iter().any(|m| m.row == row && m.col == col)
    }

    /// 去重后的坐标集合
    pub fn marked_cells(&self) -> HashSet<(u32, u16)> {
        self.marks.iter().map(|m| (m.row, m.col)).collect()
    }
}
