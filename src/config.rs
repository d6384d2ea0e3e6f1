use crate::error::ConfigError;
use crate::models::AnnotationRegion;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 默认配置文件路径（不存在时跳过）
pub const DEFAULT_CONFIG_FILE: &str = "sisat.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 下载的表格存放目录
    pub tables_dir: String,
    /// 标注后表格的输出目录（每次运行前清空）
    pub output_dir: String,
    /// 账号文件，每行一个 login:password
    pub logins_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 问题表格/失败下载的记录文件
    pub warn_file: String,
    /// 下载失败清单（JSON）
    pub failures_manifest: String,
    // --- 门户网站配置 ---
    pub login_url: String,
    pub tables_page_url: String,
    pub user_agent: String,
    /// 高亮填充色，6位十六进制 RGB
    pub highlight_color: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 学生数据所在区域
    pub region: AnnotationRegion,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tables_dir: "tables".to_string(),
            output_dir: "annotated_tables".to_string(),
            logins_file: "logins.txt".to_string(),
            output_log_file: "log_file.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            failures_manifest: "download_failures.json".to_string(),
            login_url: "http://www.edumich.gob.mx/sigem_tel/index/1/".to_string(),
            tables_page_url: "http://www.edumich.gob.mx/sigem_tel/sisat_registro_2223/\
                              3c2a3acc3ebccb7e62352756b14fd812b6913fe1/I2223/"
                .to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            highlight_color: "FFFF00".to_string(),
            verbose_logging: false,
            region: AnnotationRegion::default(),
        }
    }
}

impl Config {
    /// 按 默认值 → TOML 文件 → 环境变量 的顺序加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SISAT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        Ok(base.with_env())
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 只读环境变量（没有配置文件时的行为）
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 用环境变量覆盖当前配置；无法解析的值保留原值
    pub fn with_env(self) -> Self {
        let base = self;
        Self {
            tables_dir: std::env::var("TABLES_DIR").unwrap_or(base.tables_dir),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(base.output_dir),
            logins_file: std::env::var("LOGINS_FILE").unwrap_or(base.logins_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(base.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(base.warn_file),
            failures_manifest: std::env::var("FAILURES_MANIFEST").unwrap_or(base.failures_manifest),
            login_url: std::env::var("LOGIN_URL").unwrap_or(base.login_url),
            tables_page_url: std::env::var("TABLES_PAGE_URL").unwrap_or(base.tables_page_url),
            user_agent: std::env::var("USER_AGENT").unwrap_or(base.user_agent),
            highlight_color: std::env::var("HIGHLIGHT_COLOR").unwrap_or(base.highlight_color),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(base.verbose_logging),
            region: base.region,
        }
    }

    pub fn tables_path(&self) -> PathBuf {
        PathBuf::from(&self.tables_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            tables_dir = "descargas"
            highlight_color = "FFC7CE"

            [region]
            header_row = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.tables_dir, "descargas");
        assert_eq!(config.highlight_color, "FFC7CE");
        assert_eq!(config.output_dir, "annotated_tables");
        assert_eq!(config.region.header_row, 10);
        assert_eq!(config.region.id_column, "A");
        assert_eq!(config.region.yes_token, "SI");
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(Config::from_toml_str("tables_dir = ").is_err());
    }

    #[test]
    fn test_env_overrides_toml() {
        // 无法解析的 VERBOSE_LOGGING 不覆盖 TOML 中的值
        std::env::set_var("TABLES_DIR", "desde_entorno");
        std::env::set_var("VERBOSE_LOGGING", "quizas");

        let config = Config::from_toml_str(
            r#"
            tables_dir = "desde_toml"
            output_dir = "salida_toml"
            verbose_logging = true
            "#,
        )
        .unwrap()
        .with_env();

        std::env::remove_var("TABLES_DIR");
        std::env::remove_var("VERBOSE_LOGGING");

        assert_eq!(config.tables_dir, "desde_entorno");
        assert_eq!(config.output_dir, "salida_toml");
        assert!(config.verbose_logging);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = Config::from_file("/definitely/not/here/sisat.toml");
        assert!(matches!(result, Err(ConfigError::ReadFailed { .. })));
    }
}
