//! 下载处理器 - 编排层
//!
//! 按账号顺序逐个学校下载表格：每所学校一个独立会话，学校之间不并发。
//! 登录失败中止整次运行；单个表格的网络错误记录后继续。

use crate::clients::{DownloadOutcome, PortalClient};
use crate::config::Config;
use crate::error::{DownloadError, PortalError};
use crate::models::{Credential, DownloadFailure, DownloadReport};
use crate::services::{classify, WarnWriter};
use crate::utils::logging;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// 下载所有学校的表格
///
/// # 返回
/// 本次运行新建的下载统计；失败清单同时写入 `warn_file` 和 `failures_manifest`
pub async fn download_all(
    config: &Config,
    credentials: &[Credential],
    warn_writer: &WarnWriter,
) -> Result<DownloadReport> {
    let tables_dir = config.tables_path();
    tokio::fs::create_dir_all(&tables_dir)
        .await
        .with_context(|| format!("无法创建表格目录: {}", tables_dir.display()))?;

    let mut report = DownloadReport::new();
    for credential in credentials {
        let school_report = download_school(config, credential, &tables_dir).await?;
        report.merge(school_report);
    }

    logging::log_download_summary(&report);
    for failure in &report.failures {
        warn_writer.write_failure(failure)?;
    }
    write_failures_manifest(Path::new(&config.failures_manifest), &report)?;

    Ok(report)
}

/// 下载一所学校的全部表格
async fn download_school(config: &Config, credential: &Credential, tables_dir: &Path) -> Result<DownloadReport> {
    let school_id = credential.school_id();
    let client = PortalClient::new(config)?;
    client
        .login(credential)
        .await
        .with_context(|| format!("学校 {} 登录失败", credential))?;

    let pages = client.list_table_pages().await?;
    info!("🏫 学校 '{}' 找到 {} 个表格", school_id, pages.len());

    let mut report = DownloadReport {
        total_found: pages.len(),
        ..Default::default()
    };

    for (index, page_url) in pages.iter().enumerate() {
        let number = index + 1;
        info!("⬇️ 下载表格 {}/{} ({})", number, pages.len(), school_id);

        match client.download_table(page_url, tables_dir, school_id, number).await {
            Ok(DownloadOutcome::Saved { file_name, .. }) => {
                report.total_saved += 1;
                if let Err(e) = classify(&file_name) {
                    warn!("⚠️ 表格 {} 的文件名无法识别年级和班级: {}", file_name, e);
                    report.failures.push(DownloadFailure {
                        file_name,
                        school_id: school_id.to_string(),
                        download_url: page_url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            Ok(DownloadOutcome::Rejected(failure)) => {
                warn!("⚠️ 表格 {} 下载内容异常: {}", failure.file_name, failure.reason);
                report.failures.push(failure);
            }
            Err(DownloadError::Portal(e)) => {
                warn!("⚠️ 学校 {} 的表格 {} 下载失败: {}", school_id, number, e);
                report.failures.push(portal_failure(school_id, number, page_url, &e));
            }
            Err(e @ DownloadError::Io { .. }) => return Err(e.into()),
        }
    }

    Ok(report)
}

fn portal_failure(school_id: &str, number: usize, page_url: &str, err: &PortalError) -> DownloadFailure {
    DownloadFailure {
        file_name: format!("Unknown table {} from {}", number, school_id),
        school_id: school_id.to_string(),
        download_url: page_url.to_string(),
        reason: err.to_string(),
    }
}

/// 把下载统计写成 JSON 清单
pub fn write_failures_manifest(path: &Path, report: &DownloadReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("无法序列化下载清单")?;
    std::fs::write(path, json).with_context(|| format!("无法写入下载清单: {}", path.display()))?;
    Ok(())
}
