use std::path::PathBuf;
use thiserror::Error;

/// 表格相关错误
///
/// `Parse`、`EmptyWorkbook`、`NameFormat`、`NonUtf8Name` 属于可恢复错误，调用方应将表格记为 faulty；
/// 其余变体是致命的读写错误，直接向上传播。
#[derive(Debug, Error)]
pub enum TableError {
    /// 文件无法按表格解析
    #[error("无法解析表格 {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// 工作簿中没有任何工作表
    #[error("工作簿没有工作表: {path}")]
    EmptyWorkbook { path: PathBuf },

    /// 文件名不符合 `<学校>_..."<年级><班级>"...` 格式
    #[error("文件名格式错误 ({name}): {reason}")]
    NameFormat { name: String, reason: String },

    /// 文件名不是有效的 UTF-8，无法按文件名规则分类
    #[error("文件名不是有效的 UTF-8: {name}")]
    NonUtf8Name { name: String },

    /// 文件系统读写失败
    #[error("文件读写失败 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 写入标注后的工作簿失败
    #[error("写入工作簿失败 ({path}): {message}")]
    Workbook { path: PathBuf, message: String },
}

impl TableError {
    /// 是否属于"记为 faulty 后继续"的错误
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TableError::Parse { .. }
                | TableError::EmptyWorkbook { .. }
                | TableError::NameFormat { .. }
                | TableError::NonUtf8Name { .. }
        )
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TableError::Io {
            path: path.into(),
            source,
        }
    }
}

/// 门户网站访问错误
#[derive(Debug, Error)]
pub enum PortalError {
    /// 登录被拒绝（登录后仍停留在登录页）
    #[error("无法登录学校 {login}，请检查账号密码后重新运行")]
    LoginRejected { login: String },

    /// 网络请求失败
    #[error("请求失败 ({url}): {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 表格页面上没有下载按钮
    #[error("页面上找不到下载链接: {url}")]
    MissingDownloadLink { url: String },

    /// 无法创建 HTTP 客户端
    #[error("无法创建 HTTP 客户端: {0}")]
    Client(#[source] reqwest::Error),
}

impl PortalError {
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        PortalError::Request {
            url: url.into(),
            source,
        }
    }
}

/// 下载单个表格时的错误：网络错误可跳过，磁盘错误必须中止
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error("无法写入 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// 列名不合法
    #[error("无效的列名: '{0}'")]
    InvalidColumn(String),

    /// 起始行号不合法（行号从 1 开始）
    #[error("无效的起始行: {0}")]
    InvalidHeaderRow(u32),

    /// 颜色值不合法
    #[error("无效的颜色值: '{0}'，应为6位十六进制 RGB")]
    InvalidColor(String),

    /// 账号文件格式错误
    #[error("账号文件第 {line} 行格式错误，应为 login:password")]
    InvalidCredential { line: usize },

    /// 高亮范围输入格式错误
    #[error("无效的范围输入 '{0}'，应为两个数字，例如: 6 7.5")]
    InvalidBounds(String),
}

/// 表格处理结果类型
pub type TableResult<T> = Result<T, TableError>;
