//! 标注规则 - 业务能力层
//!
//! 在一个工作表的单元格值上执行高亮规则，只产出标注结果，不读写文件

use crate::models::{
    AnnotationReport, ColumnSpan, HighlightRange, HighlightRule, MarkedCell, PeriodBlock, RegionLayout,
};
use calamine::{Data, Range};

/// 通过比例最大分母
const MAX_FRACTION: u32 = 10;

/// 标注服务
///
/// 职责：
/// - 统计学生行数
/// - 对每个周期列块执行 平均分 / 通过比例 / 出勤确认 三条规则
/// - 不关心文件名、目录和输出格式
#[derive(Debug, Clone)]
pub struct Annotator {
    layout: RegionLayout,
}

impl Annotator {
    pub fn new(layout: RegionLayout) -> Self {
        Self { layout }
    }

    /// 从起始行开始向下扫描学号列，遇到第一个非整数（含空）单元格即停止
    pub fn pupil_count(&self, sheet: &Range<Data>) -> u32 {
        let col = u32::from(self.layout.id_column);
        let mut count = 0;
        while is_integer(sheet.get_value((self.layout.first_row + count, col))) {
            count += 1;
        }
        count
    }

    /// 对活动工作表执行全部规则
    pub fn annotate(&self, sheet: &Range<Data>, bounds: HighlightRange) -> AnnotationReport {
        let pupil_count = self.pupil_count(sheet);
        let first_row = self.layout.first_row;
        let rows = first_row..first_row + pupil_count;

        let mut marks = Vec::new();
        for block in &self.layout.blocks {
            for row in rows.clone() {
                self.check_row(sheet, block, row, bounds, &mut marks);
            }
        }

        let average_spans = if pupil_count > 0 && !bounds.is_empty() {
            self.layout
                .blocks
                .iter()
                .map(|block| ColumnSpan {
                    col: block.average,
                    first_row,
                    last_row: first_row + pupil_count - 1,
                })
                .collect()
        } else {
            Vec::new()
        };

        AnnotationReport {
            pupil_count,
            marks,
            average_spans,
            bounds,
        }
    }

    fn check_row(
        &self,
        sheet: &Range<Data>,
        block: &PeriodBlock,
        row: u32,
        bounds: HighlightRange,
        marks: &mut Vec<MarkedCell>,
    ) {
        let cell = |col: u16| sheet.get_value((row, u32::from(col)));
        let mut mark = |col: u16, rule: HighlightRule| {
            marks.push(MarkedCell {
                row,
                col,
                period: block.label.clone(),
                rule,
            })
        };

        if numeric_value(cell(block.average)).is_some_and(|v| bounds.contains(v)) {
            mark(block.average, HighlightRule::AverageInRange);
        }

        if !is_accepted_fraction(cell(block.approval_fraction)) {
            mark(block.approval_fraction, HighlightRule::MalformedFraction);
        }

        let confirmed = is_token(cell(block.present_flag), &self.layout.yes_token);
        if !confirmed && !is_blank(cell(block.absence_reason)) {
            mark(block.present_flag, HighlightRule::MissingPresentFlag);
        }
    }
}

/// 整数单元格：整型，或没有小数部分的浮点数
pub fn is_integer(value: Option<&Data>) -> bool {
    match value {
        Some(Data::Int(_)) => true,
        Some(Data::Float(f)) => f.is_finite() && f.fract() == 0.0,
        _ => false,
    }
}

/// 空单元格或只含空白的文本
pub fn is_blank(value: Option<&Data>) -> bool {
    match value {
        None | Some(Data::Empty) => true,
        Some(Data::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// 平均分的数值；文本形式的数字也接受
pub fn numeric_value(value: Option<&Data>) -> Option<f64> {
    match value? {
        Data::Int(n) => Some(*n as f64),
        Data::Float(f) => Some(*f),
        Data::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// 通过比例只接受空值或 `1/1` 到 `10/10`
pub fn is_accepted_fraction(value: Option<&Data>) -> bool {
    match value {
        None | Some(Data::Empty) => true,
        Some(Data::String(s)) if s.is_empty() => true,
        Some(Data::String(s)) => (1..=MAX_FRACTION).any(|k| *s == format!("{k}/{k}")),
        _ => false,
    }
}

fn is_token(value: Option<&Data>, token: &str) -> bool {
    matches!(value, Some(Data::String(s)) if s == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 默认区域：起始行 13（0 起始 12），学号列 A，第一个列块 E/F/G/H
    const FIRST: u32 = 12;
    const AVG: u32 = 4;
    const FRAC: u32 = 5;
    const FLAG: u32 = 6;
    const REASON: u32 = 7;

    fn sheet() -> Range<Data> {
        Range::new((0, 0), (40, 20))
    }

    fn with_pupils(count: u32) -> Range<Data> {
        let mut range = sheet();
        for i in 0..count {
            range.set_value((FIRST + i, 0), Data::Float(f64::from(i + 1)));
        }
        range
    }

    fn annotator() -> Annotator {
        Annotator::new(RegionLayout::default())
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_pupil_count_stops_at_first_non_integer() {
        let mut range = with_pupils(3);
        range.set_value((FIRST + 3, 0), text("Total"));
        range.set_value((FIRST + 4, 0), Data::Int(5));

        assert_eq!(annotator().pupil_count(&range), 3);
    }

    #[test]
    fn test_pupil_count_zero() {
        let mut range = sheet();
        range.set_value((FIRST, 0), Data::Float(1.5));
        assert_eq!(annotator().pupil_count(&range), 0);

        let report = annotator().annotate(&range, HighlightRange::new(0.0, 10.0));
        assert_eq!(report.pupil_count, 0);
        assert!(report.marks.is_empty());
        assert!(report.average_spans.is_empty());
    }

    #[test]
    fn test_pupil_count_runs_to_end_of_range() {
        let mut range = Range::new((0, 0), (14, 0));
        range.set_value((12, 0), Data::Int(1));
        range.set_value((13, 0), Data::Int(2));
        range.set_value((14, 0), Data::Int(3));
        assert_eq!(annotator().pupil_count(&range), 3);
    }

    #[test]
    fn test_average_range_is_inclusive() {
        let mut range = with_pupils(5);
        range.set_value((FIRST, AVG), Data::Float(6.0));
        range.set_value((FIRST + 1, AVG), Data::Float(8.0));
        range.set_value((FIRST + 2, AVG), Data::Float(5.0));
        range.set_value((FIRST + 3, AVG), Data::Float(9.0));
        range.set_value((FIRST + 4, AVG), text(" 7.5 "));

        let report = annotator().annotate(&range, HighlightRange::new(6.0, 8.0));
        let rows: Vec<u32> = report
            .marks
            .iter()
            .filter(|m| m.rule == HighlightRule::AverageInRange)
            .map(|m| m.row)
            .collect();
        assert_eq!(rows, vec![FIRST, FIRST + 1, FIRST + 4]);
    }

    #[test]
    fn test_empty_average_is_never_in_range() {
        let mut range = with_pupils(2);
        range.set_value((FIRST, AVG), text(""));

        let report = annotator().annotate(&range, HighlightRange::new(f64::MIN, f64::MAX));
        assert_eq!(report.count(HighlightRule::AverageInRange), 0);
    }

    #[test]
    fn test_reversed_bounds_mark_nothing() {
        let mut range = with_pupils(1);
        range.set_value((FIRST, AVG), Data::Float(7.0));

        let report = annotator().annotate(&range, HighlightRange::new(8.0, 6.0));
        assert_eq!(report.count(HighlightRule::AverageInRange), 0);
        assert!(report.average_spans.is_empty());
    }

    #[test]
    fn test_fraction_rule() {
        assert!(is_accepted_fraction(None));
        assert!(is_accepted_fraction(Some(&Data::Empty)));
        assert!(is_accepted_fraction(Some(&text(""))));
        assert!(is_accepted_fraction(Some(&text("1/1"))));
        assert!(is_accepted_fraction(Some(&text("7/7"))));
        assert!(is_accepted_fraction(Some(&text("10/10"))));

        assert!(!is_accepted_fraction(Some(&text("7/8"))));
        assert!(!is_accepted_fraction(Some(&text("3/5"))));
        assert!(!is_accepted_fraction(Some(&text("0/0"))));
        assert!(!is_accepted_fraction(Some(&text("11/11"))));
        assert!(!is_accepted_fraction(Some(&text("07/07"))));
        assert!(!is_accepted_fraction(Some(&text("abc"))));
        assert!(!is_accepted_fraction(Some(&Data::Float(1.0))));
    }

    #[test]
    fn test_fraction_cells_are_marked() {
        let mut range = with_pupils(3);
        range.set_value((FIRST, FRAC), text("7/7"));
        range.set_value((FIRST + 1, FRAC), text("7/8"));

        let report = annotator().annotate(&range, HighlightRange::new(0.0, 1.0));
        let fractions: Vec<(u32, u16)> = report
            .marks
            .iter()
            .filter(|m| m.rule == HighlightRule::MalformedFraction)
            .map(|m| (m.row, m.col))
            .collect();
        assert_eq!(fractions, vec![(FIRST + 1, FRAC as u16)]);
    }

    #[test]
    fn test_present_flag_rule() {
        let mut range = with_pupils(4);
        // SI + 原因：不标记
        range.set_value((FIRST, FLAG), text("SI"));
        range.set_value((FIRST, REASON), text("Enfermedad"));
        // NO + 原因：标记
        range.set_value((FIRST + 1, FLAG), text("NO"));
        range.set_value((FIRST + 1, REASON), text("Viaje"));
        // NO 无原因：不标记
        range.set_value((FIRST + 2, FLAG), text("NO"));
        // 空 + 原因：标记
        range.set_value((FIRST + 3, REASON), text("Sin justificar"));

        let report = annotator().annotate(&range, HighlightRange::new(0.0, 1.0));
        let flagged: Vec<u32> = report
            .marks
            .iter()
            .filter(|m| m.rule == HighlightRule::MissingPresentFlag)
            .map(|m| m.row)
            .collect();
        assert_eq!(flagged, vec![FIRST + 1, FIRST + 3]);
        assert!(report.marks.iter().all(|m| m.rule != HighlightRule::MissingPresentFlag || m.col == FLAG as u16));
    }

    #[test]
    fn test_rules_apply_to_every_period_block() {
        let mut range = with_pupils(1);
        for block in 0..4 {
            range.set_value((FIRST, AVG + 4 * block), Data::Int(7));
        }

        let report = annotator().annotate(&range, HighlightRange::new(7.0, 7.0));
        let periods: Vec<&str> = report.marks.iter().map(|m| m.period.as_str()).collect();
        assert_eq!(periods, vec!["1", "2", "3", "Final"]);

        let cols: Vec<u16> = report.average_spans.iter().map(|s| s.col).collect();
        assert_eq!(cols, vec![4, 8, 12, 16]);
        assert!(report.average_spans.iter().all(|s| s.first_row == FIRST && s.last_row == FIRST));
    }

    #[test]
    fn test_rows_below_pupils_are_ignored() {
        let mut range = with_pupils(2);
        range.set_value((FIRST + 2, AVG), Data::Float(7.0));
        range.set_value((FIRST + 2, FRAC), text("3/5"));

        let report = annotator().annotate(&range, HighlightRange::new(0.0, 10.0));
        assert!(report.marks.is_empty());
    }
}
