/// 成绩门户网站客户端
///
/// 封装登录、列出表格页面、下载表格三个请求；每所学校使用一个独立会话
use crate::config::Config;
use crate::error::{DownloadError, PortalError};
use crate::models::{Credential, DownloadFailure};
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// 表格列表页中指向表格页面的链接标题
pub const TABLE_LINK_TITLE: &str = "Concentrado de Información";

/// 表格页面中下载按钮的 class
pub const DOWNLOAD_BUTTON_CLASS: &str = "btn btn-warning btn-sm";

/// xlsx 的 MIME 类型
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

static DISPOSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^.*="(.+)"$"#).expect("文件名正则无效"));

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<a\s[^>]*>").expect("链接正则无效"));

static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)([\w-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("属性正则无效"));

/// 单个表格的下载结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// 已保存到磁盘
    Saved { file_name: String, path: PathBuf },
    /// 服务器返回的不是表格文件
    Rejected(DownloadFailure),
}

/// 门户网站客户端
pub struct PortalClient {
    client: Client,
    login_url: String,
    tables_page_url: String,
    user_agent: String,
}

impl PortalClient {
    /// 创建带 cookie 会话的新客户端
    pub fn new(config: &Config) -> Result<Self, PortalError> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(PortalError::Client)?;

        Ok(Self {
            client,
            login_url: config.login_url.clone(),
            tables_page_url: config.tables_page_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// 登录学校账号
    ///
    /// 登录后仍停留在登录页视为账号或密码错误
    pub async fn login(&self, credential: &Credential) -> Result<(), PortalError> {
        let form = [
            ("inputEmail", ""),
            ("inputPassword", credential.password.as_str()),
            ("grabar", "si"),
        ];

        let response = self
            .client
            .post(&self.login_url)
            .form(&form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PortalError::request(&self.login_url, e))?;

        if response.url().as_str() == self.login_url {
            return Err(PortalError::LoginRejected {
                login: credential.login.clone(),
            });
        }

        debug!("学校 {} 登录成功", credential);
        Ok(())
    }

    /// 列出所有表格页面的地址
    pub async fn list_table_pages(&self) -> Result<Vec<String>, PortalError> {
        let html = self.get_text(&self.tables_page_url).await?;
        let base = Url::parse(&self.tables_page_url).ok();

        let urls = extract_links_by_attr(&html, "title", TABLE_LINK_TITLE)
            .into_iter()
            .map(|href| resolve_url(base.as_ref(), &href))
            .collect();
        Ok(urls)
    }

    /// 下载一个表格
    ///
    /// # 参数
    /// - `table_page_url`: 表格页面地址
    /// - `tables_dir`: 保存目录
    /// - `school_id`: 学校标识，作为文件名前缀
    /// - `index`: 表格序号（从1开始，用于无法识别时的占位名）
    ///
    /// # 返回
    /// 保存成功返回文件名；内容类型不对时返回失败记录。
    /// 网络错误返回 `DownloadError::Portal`，磁盘写入错误返回 `DownloadError::Io`
    pub async fn download_table(
        &self,
        table_page_url: &str,
        tables_dir: &Path,
        school_id: &str,
        index: usize,
    ) -> Result<DownloadOutcome, DownloadError> {
        let html = self.get_text(table_page_url).await?;
        let download_url = extract_links_by_attr(&html, "class", DOWNLOAD_BUTTON_CLASS)
            .into_iter()
            .next()
            .map(|href| resolve_url(Url::parse(table_page_url).ok().as_ref(), &href))
            .ok_or_else(|| PortalError::MissingDownloadLink {
                url: table_page_url.to_string(),
            })?;

        let mut response = self
            .client
            .get(&download_url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PortalError::request(&download_url, e))?;

        let content_type = header_text(response.headers().get(CONTENT_TYPE)).unwrap_or_default();
        if !is_xlsx_content_type(&content_type) {
            return Ok(DownloadOutcome::Rejected(DownloadFailure {
                file_name: format!("Unknown table {} from {}", index, school_id),
                school_id: school_id.to_string(),
                download_url,
                reason: format!("文件类型错误: {}", content_type),
            }));
        }

        let disposition = header_text(response.headers().get(CONTENT_DISPOSITION)).unwrap_or_default();
        let Some(remote_name) = file_name_from_disposition(&disposition) else {
            return Ok(DownloadOutcome::Rejected(DownloadFailure {
                file_name: format!("Unknown table {} from {}", index, school_id),
                school_id: school_id.to_string(),
                download_url,
                reason: "响应中没有文件名".to_string(),
            }));
        };

        let file_name = format!("{}_{}", school_id, remote_name);
        let path = tables_dir.join(&file_name);
        let part = partial_path(&path);

        // 先写入 .part 文件，完整写完才改名，中断时不留下半个表格
        let saved = match stream_to_file(&mut response, &download_url, &part).await {
            Ok(()) => tokio::fs::rename(&part, &path)
                .await
                .map_err(|source| DownloadError::Io { path: path.clone(), source }),
            Err(e) => Err(e),
        };
        if let Err(e) = saved {
            remove_partial(&part).await;
            return Err(e);
        }

        info!("已保存表格: {}", file_name);
        Ok(DownloadOutcome::Saved { file_name, path })
    }

    async fn get_text(&self, url: &str) -> Result<String, PortalError> {
        self.client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PortalError::request(url, e))?
            .text()
            .await
            .map_err(|e| PortalError::request(url, e))
    }
}

async fn stream_to_file(
    response: &mut reqwest::Response,
    download_url: &str,
    part: &Path,
) -> Result<(), DownloadError> {
    let io_err = |source: std::io::Error| DownloadError::Io {
        path: part.to_path_buf(),
        source,
    };
    let mut file = tokio::fs::File::create(part).await.map_err(io_err)?;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| PortalError::request(download_url, e))?
    {
        file.write_all(&chunk).await.map_err(io_err)?;
    }
    file.flush().await.map_err(io_err)?;
    Ok(())
}

/// 下载中的临时文件名：`<文件名>.part`，不以 `.xlsx` 结尾，不会被当作候选表格
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// 删除未写完的临时文件；文件不存在时什么也不做
async fn remove_partial(part: &Path) {
    match tokio::fs::remove_file(part).await {
        Ok(()) => debug!("已删除未完成的下载: {}", part.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("⚠️ 无法删除未完成的下载 {}: {}", part.display(), e),
    }
}

/// 从 `Content-Disposition` 中取出文件名：最后一个 `="..."` 中的内容
///
/// 文件名本身可以包含引号，例如 `attachment; filename="Concentrado "1A".xlsx"`
pub fn file_name_from_disposition(disposition: &str) -> Option<String> {
    let name = DISPOSITION_RE.captures(disposition.trim())?.get(1)?.as_str();
    // 不允许文件名跳出保存目录
    let name = name.replace(['/', '\\'], "_");
    (!name.is_empty()).then_some(name)
}

/// 找出所有 `attr` 属性值等于 `value` 的 `<a>` 标签的 `href`
pub fn extract_links_by_attr(html: &str, attr: &str, value: &str) -> Vec<String> {
    ANCHOR_RE
        .find_iter(html)
        .filter_map(|tag| {
            let mut matched = false;
            let mut href = None;
            for caps in ATTR_RE.captures_iter(tag.as_str()) {
                let name = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
                let raw = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()).unwrap_or("");
                let decoded = decode_entities(raw);
                match name.as_deref() {
                    Some(n) if n == attr && decoded.trim() == value => matched = true,
                    Some("href") => href = Some(decoded),
                    _ => {}
                }
            }
            if matched {
                href
            } else {
                None
            }
        })
        .collect()
}

/// 解码 HTML 属性中常见的实体
fn decode_entities(text: &str) -> String {
    const ENTITIES: &[(&str, &str)] = &[
        ("&oacute;", "ó"),
        ("&aacute;", "á"),
        ("&eacute;", "é"),
        ("&iacute;", "í"),
        ("&uacute;", "ú"),
        ("&ntilde;", "ñ"),
        ("&#243;", "ó"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&lt;", "<"),
        ("&gt;", ">"),
    ];
    let mut decoded = text.to_string();
    for (entity, replacement) in ENTITIES {
        decoded = decoded.replace(entity, replacement);
    }
    // &amp; 最后处理，避免二次解码
    decoded.replace("&amp;", "&")
}

/// 只比较 `;` 之前的 MIME 类型
fn is_xlsx_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(XLSX_CONTENT_TYPE))
}

fn resolve_url(base: Option<&Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map(String::from)
        .unwrap_or_else(|| href.to_string())
}

fn header_text(value: Option<&reqwest::header::HeaderValue>) -> Option<String> {
    value.map(|v| match v.to_str() {
        Ok(s) => s.to_string(),
        // 部分服务器用 Latin-1 发送文件名
        Err(_) => v.as_bytes().iter().map(|&b| b as char).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_download_is_not_a_candidate() {
        let part = partial_path(Path::new(r#"tablas/E1_Concentrado "1A".xlsx"#));
        assert_eq!(part, Path::new(r#"tablas/E1_Concentrado "1A".xlsx.part"#));
        assert!(!crate::workflow::is_candidate(&part.file_name().unwrap().to_string_lossy()));
    }

    #[test]
    fn test_remove_partial_deletes_leftover() {
        let dir = tempfile::TempDir::new().unwrap();
        let part = dir.path().join("E1_roto.xlsx.part");
        std::fs::write(&part, b"PK\x03\x04 medio archivo").unwrap();

        tokio_test::block_on(remove_partial(&part));
        assert!(!part.exists());

        // 再删一次：文件已不存在，不报错
        tokio_test::block_on(remove_partial(&part));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_extract_table_links() {
        let html = r#"
            <a href="/sisat/tabla/1" title="Concentrado de Informaci&oacute;n"><i></i></a>
            <a title="Otra cosa" href="/sisat/otra">x</a>
            <A TITLE="Concentrado de Información"
               HREF="/sisat/tabla/2?a=1&amp;b=2">y</A>
        "#;

        let links = extract_links_by_attr(html, "title", TABLE_LINK_TITLE);
        assert_eq!(links, vec!["/sisat/tabla/1", "/sisat/tabla/2?a=1&b=2"]);
    }

    #[test]
    fn test_extract_download_button() {
        let html = r#"
            <a class="btn btn-primary btn-sm" href="/ver">ver</a>
            <a class='btn btn-warning btn-sm' href='/descargar/55'>Descargar</a>
        "#;

        let links = extract_links_by_attr(html, "class", DOWNLOAD_BUTTON_CLASS);
        assert_eq!(links, vec!["/descargar/55"]);
    }

    #[test]
    fn test_file_name_from_disposition() {
        assert_eq!(
            file_name_from_disposition(r#"attachment; filename="Concentrado "1A" matutino.xlsx""#),
            Some(r#"Concentrado "1A" matutino.xlsx"#.to_string())
        );
        assert_eq!(
            file_name_from_disposition(r#"attachment; filename="../../etc.xlsx""#),
            Some(".._.._etc.xlsx".to_string())
        );
        assert_eq!(file_name_from_disposition("attachment"), None);
        assert_eq!(file_name_from_disposition(""), None);
    }

    #[test]
    fn test_is_xlsx_content_type() {
        assert!(is_xlsx_content_type(XLSX_CONTENT_TYPE));
        assert!(is_xlsx_content_type(&format!("{}; charset=binary", XLSX_CONTENT_TYPE)));
        assert!(!is_xlsx_content_type("text/html; charset=UTF-8"));
        assert!(!is_xlsx_content_type(""));
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("http://portal.example/sisat/lista/").unwrap();
        assert_eq!(resolve_url(Some(&base), "/tabla/1"), "http://portal.example/tabla/1");
        assert_eq!(resolve_url(Some(&base), "http://otro/x"), "http://otro/x");
        assert_eq!(resolve_url(None, "/tabla/1"), "/tabla/1");
    }
}
