/// 日志工具模块
///
/// 提供日志初始化，以及日志格式化和输出的辅助函数
use crate::config::Config;
use crate::models::DownloadReport;
use crate::workflow::Categorization;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化 tracing：控制台 + 运行日志文件
///
/// `RUST_LOG` 优先；未设置时默认 `info`，`verbose_logging` 时为 `debug`。
/// 重复调用（例如测试中）不会报错
pub fn init(config: &Config) -> Result<()> {
    let default_level = if config.verbose_logging { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.output_log_file)
        .with_context(|| format!("无法打开日志文件: {}", config.output_log_file))?;

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .try_init();
    Ok(())
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
///
/// 每次运行覆盖上一次的日志
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n成绩表格处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 成绩表格标注");
    info!("📁 表格目录: {}", config.tables_dir);
    info!("📂 输出目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

/// 记录分类结果
pub fn log_categorization(categorization: &Categorization) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📋 分类完成: {} 所学校, {} 个表格",
        categorization.map.schools().count(),
        categorization.tables.len()
    );
    if !categorization.faulty.is_empty() {
        warn!("⚠️ 问题表格 {} 个:", categorization.faulty.len());
        for table in categorization.faulty.iter() {
            warn!("  - {} ({})", table.name, table.reason);
        }
    }
    info!("{}", "─".repeat(60));
}

/// 记录下载统计
pub fn log_download_summary(report: &DownloadReport) {
    info!("\n{}", "=".repeat(60));
    info!("📥 下载完成: 保存 {}/{} 个表格", report.total_saved, report.total_found);
    for failure in &report.failures {
        warn!(
            "⚠️ 表格 {} (学校 {}) 下载失败: {}。请登录学校 {} 并访问 {} 手动下载",
            failure.file_name, failure.school_id, failure.reason, failure.school_id, failure.download_url
        );
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `annotated`: 已标注的表格数量
/// - `faulty`: 问题表格数量
/// - `config`: 用于显示日志和警告文件位置
pub fn print_final_stats(annotated: usize, faulty: usize, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!("完成时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("✅ 已标注: {}", annotated);
    info!("❌ 问题表格: {}", faulty);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
    if faulty > 0 {
        info!("问题表格清单: {}", config.warn_file);
    }
}
