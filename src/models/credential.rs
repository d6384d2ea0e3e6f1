use crate::error::ConfigError;
use std::fmt::Display;

/// 一所学校的登录凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub login: String,
    pub password: String,
}

impl Credential {
    /// 解析一行 `login:password`，密码中允许再出现 `:`
    pub fn parse(line: &str, line_number: usize) -> Result<Self, ConfigError> {
        let (login, password) = line
            .trim()
            .split_once(':')
            .ok_or(ConfigError::InvalidCredential { line: line_number })?;
        if login.is_empty() {
            return Err(ConfigError::InvalidCredential { line: line_number });
        }
        Ok(Self {
            login: login.to_string(),
            password: password.to_string(),
        })
    }

    /// 学校标识：登录名中第一个 `_` 之前的部分
    pub fn school_id(&self) -> &str {
        self.login.split('_').next().unwrap_or(&self.login)
    }
}

// 日志中不输出密码
impl Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.login)
    }
}
