//! # SISAT Tables
//!
//! 下载并标注学校成绩汇总表格（SISAT 报表）的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 工作簿读写，只暴露能力
//! - `LoadedWorkbook` - 读出所有工作表的单元格值
//! - `save_annotated` - 写出带高亮的副本
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个表格
//! - `TableValidator` - 文件能否打开
//! - `classify` - 从文件名解析 学校/年级/班级
//! - `Annotator` - 平均分 / 通过比例 / 出勤确认 规则
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 客户端（Clients）
//! - `PortalClient` - 登录门户网站并下载表格
//!
//! ### ④ 流程层（Workflow）
//! - `Categorizer` - 一个目录列表的分类流程（校验 → 分类 → 插入映射）
//! - `AnnotateFlow` - 一个表格的标注流程（读取 → 规则 → 写出）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 一次运行的阶段调度
//! - `orchestrator/download_processor` - 逐个学校下载
//! - `orchestrator/table_processor` - 处理整个表格目录
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::PortalClient;
pub use config::Config;
pub use error::{ConfigError, PortalError, TableError, TableResult};
pub use infrastructure::{HighlightStyle, LoadedWorkbook};
pub use models::{AnnotationReport, CategoryMap, FaultyTables, HighlightRange, RegionLayout, RunMode};
pub use orchestrator::{process_tables, App, ProcessReport, RunSummary};
pub use services::{classify, Annotator};
pub use workflow::{annotate_file, Categorization, Categorizer};
