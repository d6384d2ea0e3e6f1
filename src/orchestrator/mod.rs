//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次运行的流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用主流程
//! - 管理应用生命周期（初始化、运行）
//! - 根据运行模式决定是否先下载
//! - 输出全局统计信息
//!
//! ### `download_processor` - 下载处理器
//! - 逐个学校登录并下载表格
//! - 汇总下载统计和失败清单
//!
//! ### `table_processor` - 表格目录处理器
//! - 分类表格目录（Categorizer）
//! - 重建输出目录
//! - 逐个表格执行 AnnotateFlow
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (一次运行)
//!     ↓
//! download_processor / table_processor (全部学校 / 全部表格)
//!     ↓
//! workflow::Categorizer / workflow::AnnotateFlow (单个目录 / 单个表格)
//!     ↓
//! services (能力层：validator / classifier / annotator / warn)
//!     ↓
//! infrastructure (基础设施：工作簿读写)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管阶段，其余处理器管各自的批量
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无业务逻辑**：只做调度和统计，不做具体规则判断

pub mod batch_processor;
pub mod download_processor;
pub mod table_processor;

// 重新导出主要类型
pub use batch_processor::{App, RunSummary};
pub use download_processor::download_all;
pub use table_processor::{process_tables, ProcessReport};
