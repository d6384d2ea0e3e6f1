use crate::models::credential::Credential;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从账号文件加载全部凭据
///
/// 每行一个 `login:password`，空行跳过；任何一行格式错误都会中止加载，
/// 保证下载开始前账号文件已被完整读取
pub async fn load_credentials(logins_file: impl AsRef<Path>) -> Result<Vec<Credential>> {
    let logins_file = logins_file.as_ref();
    let content = fs::read_to_string(logins_file)
        .await
        .with_context(|| format!("无法读取账号文件: {}", logins_file.display()))?;

    let credentials = parse_credentials(&content)
        .with_context(|| format!("无法解析账号文件: {}", logins_file.display()))?;

    tracing::info!("成功加载 {} 个学校账号", credentials.len());
    Ok(credentials)
}

/// 解析账号文件内容
pub fn parse_credentials(content: &str) -> Result<Vec<Credential>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| Credential::parse(line, index + 1).map_err(Into::into))
        .collect()
}
