//! 单个表格标注流程 - 流程层
//!
//! 流程顺序：读取工作簿 → 在活动工作表上执行规则 → 写出副本（文件名不变）

use crate::error::{TableError, TableResult};
use crate::infrastructure::{save_annotated, HighlightStyle, LoadedWorkbook};
use crate::models::{column_name, AnnotationReport, HighlightRange, HighlightRule, TableFile};
use crate::services::Annotator;
use crate::workflow::TableCtx;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 标注流程
///
/// - 不持有工作簿，每个表格打开、处理、写出后即释放
/// - 读写错误直接返回，由编排层中止整次运行
pub struct AnnotateFlow<'a> {
    annotator: &'a Annotator,
    style: HighlightStyle,
    output_dir: PathBuf,
}

impl<'a> AnnotateFlow<'a> {
    pub fn new(annotator: &'a Annotator, style: HighlightStyle, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            annotator,
            style,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_path(&self, table: &TableFile) -> PathBuf {
        self.output_dir.join(&table.name)
    }

    pub fn run(&self, table: &TableFile, bounds: HighlightRange, ctx: &TableCtx) -> TableResult<AnnotationReport> {
        let report = annotate_file(&table.path, &self.output_path(table), self.annotator, bounds, &self.style)?;

        info!(
            "{} {} {} | 学生 {} | 平均分 {} | 比例 {} | 出勤 {}",
            ctx,
            ctx.name,
            table.info,
            report.pupil_count,
            report.count(HighlightRule::AverageInRange),
            report.count(HighlightRule::MalformedFraction),
            report.count(HighlightRule::MissingPresentFlag),
        );
        for mark in &report.marks {
            debug!(
                "{} 标记 {}{} (周期 {}): {:?}",
                ctx,
                column_name(mark.col),
                mark.row + 1,
                mark.period,
                mark.rule
            );
        }
        Ok(report)
    }
}

/// 标注一个表格文件并写到 `output_path`
pub fn annotate_file(
    input_path: &Path,
    output_path: &Path,
    annotator: &Annotator,
    bounds: HighlightRange,
    style: &HighlightStyle,
) -> TableResult<AnnotationReport> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(TableError::io(
                parent,
                std::io::Error::new(std::io::ErrorKind::NotFound, "输出目录不存在"),
            ));
        }
    }

    let workbook = LoadedWorkbook::open(input_path)?;
    let report = annotator.annotate(&workbook.active.range, bounds);
    save_annotated(&workbook, &report, style, output_path)?;
    Ok(report)
}
