//! 警告写入服务 - 业务能力层
//!
//! 只负责把需要人工处理的表格写入 warn.txt，不关心流程

use crate::models::{DownloadFailure, FaultyTable};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// 警告写入服务
///
/// 职责：
/// - 记录无法处理的表格（损坏或文件名不符合格式）
/// - 记录下载失败的表格及人工下载方式
/// - 每次运行开始时清空，避免混入上一次运行的记录
pub struct WarnWriter {
    warn_file_path: PathBuf,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self::with_path("warn.txt")
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 清空警告文件
    pub fn reset(&self) -> Result<()> {
        std::fs::write(&self.warn_file_path, "")
            .with_context(|| format!("无法清空警告文件: {}", self.warn_file_path.display()))
    }

    /// 写入问题表格
    pub fn write_faulty(&self, table: &FaultyTable) -> Result<()> {
        debug!("写入问题表格: {}", table.name);
        self.append(&format!(
            "问题表格 {} | 原因: {} | 已跳过，请人工检查\n",
            table.name, table.reason
        ))
    }

    /// 写入下载失败记录
    pub fn write_failure(&self, failure: &DownloadFailure) -> Result<()> {
        debug!("写入下载失败: {}", failure.file_name);
        self.append(&format!(
            "下载失败 {} | 学校: {} | 原因: {} | 请登录学校 {} 后访问 {} 手动下载，并放入表格目录\n",
            failure.file_name, failure.school_id, failure.reason, failure.school_id, failure.download_url
        ))
    }

    fn append(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .with_context(|| format!("无法打开警告文件: {}", self.warn_file_path.display()))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_then_append() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("warn.txt");
        std::fs::write(&path, "上一次运行\n").unwrap();

        let writer = WarnWriter::with_path(&path);
        writer.reset().unwrap();
        writer
            .write_faulty(&FaultyTable {
                name: "A_roto.xlsx".to_string(),
                reason: "无法解析".to_string(),
            })
            .unwrap();
        writer
            .write_failure(&DownloadFailure {
                file_name: "Unknown table 2 from A".to_string(),
                school_id: "A".to_string(),
                download_url: "http://portal/descarga/2".to_string(),
                reason: "文件类型错误".to_string(),
            })
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("上一次运行"));
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("A_roto.xlsx"));
        assert!(content.contains("http://portal/descarga/2"));
    }
}
