//! 应用主流程 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次运行的资源准备和阶段调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：解析区域布局和高亮颜色，清空警告文件
//! 2. **下载阶段**（可选）：读取账号文件，逐个学校下载表格
//! 3. **处理阶段**：分类表格目录并标注所有有效表格
//! 4. **全局统计**：汇总本次运行的结果
//!
//! 每次 `run` 都新建统计对象，不在多次运行之间共享状态

use crate::config::Config;
use crate::infrastructure::HighlightStyle;
use crate::models::{load_credentials, DownloadReport, HighlightRange, RunMode};
use crate::orchestrator::download_processor::download_all;
use crate::orchestrator::table_processor::{process_tables, ProcessReport};
use crate::services::{Annotator, WarnWriter};
use crate::utils::logging;
use anyhow::{Context, Result};
use tracing::info;

/// 应用主结构
pub struct App {
    config: Config,
    annotator: Annotator,
    style: HighlightStyle,
    warn_writer: WarnWriter,
}

/// 一次运行的汇总
#[derive(Debug)]
pub struct RunSummary {
    /// 只处理模式下为 `None`
    pub download: Option<DownloadReport>,
    pub process: ProcessReport,
}

impl App {
    /// 初始化应用
    ///
    /// 配置中的列名或颜色不合法时返回错误
    pub fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let layout = config.region.layout().context("区域配置无效")?;
        let style = HighlightStyle::from_hex(&config.highlight_color).context("高亮颜色无效")?;
        let warn_writer = WarnWriter::with_path(&config.warn_file);
        warn_writer.reset()?;

        Ok(Self {
            config,
            annotator: Annotator::new(layout),
            style,
            warn_writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, mode: RunMode, bounds: HighlightRange) -> Result<RunSummary> {
        let download = match mode {
            RunMode::DownloadAndProcess => Some(self.download().await?),
            RunMode::ProcessOnly => None,
        };

        info!("\n🎨 开始标注平均分在 {} 之间的表格...", bounds);
        let process = process_tables(&self.config, &self.annotator, self.style, bounds, &self.warn_writer)?;

        logging::print_final_stats(process.annotated_count(), process.faulty_count(), &self.config);
        Ok(RunSummary { download, process })
    }

    async fn download(&self) -> Result<DownloadReport> {
        let credentials = load_credentials(&self.config.logins_file).await?;
        info!("🔑 读取到 {} 个学校账号", credentials.len());
        download_all(&self.config, &credentials, &self.warn_writer).await
    }
}
