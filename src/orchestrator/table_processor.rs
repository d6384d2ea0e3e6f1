//! 表格目录处理器 - 编排层
//!
//! 对表格目录执行一次完整的"只处理"流程：
//! 列出目录 → 分类 → 记录问题表格 → 重建输出目录 → 逐个标注

use crate::config::Config;
use crate::error::{TableError, TableResult};
use crate::infrastructure::HighlightStyle;
use crate::models::{list_table_names, AnnotationReport, HighlightRange};
use crate::services::{Annotator, TableValidator, WarnWriter};
use crate::utils::logging;
use crate::workflow::{AnnotateFlow, Categorization, Categorizer, TableCtx};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// 一次处理运行的结果，每次运行重新创建
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub categorization: Categorization,
    /// 按处理顺序排列的 (文件名, 标注结果)
    pub annotated: Vec<(String, AnnotationReport)>,
}

impl ProcessReport {
    pub fn annotated_count(&self) -> usize {
        self.annotated.len()
    }

    pub fn faulty_count(&self) -> usize {
        self.categorization.faulty.len()
    }

    pub fn report_for(&self, name: &str) -> Option<&AnnotationReport> {
        self.annotated.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }
}

/// 处理表格目录中的全部表格
///
/// 问题表格写入 `warn_writer` 后跳过；输出目录的读写错误中止整次运行
pub fn process_tables(
    config: &Config,
    annotator: &Annotator,
    style: HighlightStyle,
    bounds: HighlightRange,
    warn_writer: &WarnWriter,
) -> Result<ProcessReport> {
    info!("\n📁 正在扫描表格目录: {}", config.tables_dir);
    let tables_dir = config.tables_path();
    let listing = list_table_names(&tables_dir)?;

    let validator = TableValidator::new();
    let categorization = Categorizer::new(&validator).categorize_listing(&tables_dir, &listing);
    logging::log_categorization(&categorization);

    for table in categorization.faulty.iter() {
        warn_writer.write_faulty(table)?;
    }

    let output_dir = config.output_path();
    reset_output_dir(&output_dir).context("无法重建输出目录")?;

    info!("🎨 高亮平均分范围: {}", bounds);
    let flow = AnnotateFlow::new(annotator, style, &output_dir);
    let total = categorization.tables.len();
    let mut annotated = Vec::with_capacity(total);

    for (index, table) in categorization.tables.iter().enumerate() {
        let ctx = TableCtx::new(index + 1, total, table.name.as_str());
        let report = flow
            .run(table, bounds, &ctx)
            .with_context(|| format!("{} 标注失败: {}", ctx, table.name))?;
        annotated.push((table.name.clone(), report));
    }

    Ok(ProcessReport {
        categorization,
        annotated,
    })
}

/// 清空并重新创建输出目录
pub fn reset_output_dir(output_dir: &Path) -> TableResult<()> {
    if output_dir.exists() {
        std::fs::remove_dir_all(output_dir).map_err(|e| TableError::io(output_dir, e))?;
    }
    std::fs::create_dir_all(output_dir).map_err(|e| TableError::io(output_dir, e))
}
