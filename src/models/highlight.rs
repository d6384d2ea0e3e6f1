use crate::error::ConfigError;
use std::fmt::Display;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 先从网站下载，再标注
    DownloadAndProcess,
    /// 只标注本地已有的表格
    ProcessOnly,
}

impl RunMode {
    /// `d` 下载并处理，`p` 只处理，其他输入无效
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim() {
            "d" => Some(RunMode::DownloadAndProcess),
            "p" => Some(RunMode::ProcessOnly),
            _ => None,
        }
    }
}

/// 平均分高亮范围，两端都包含
///
/// 不校验 `min <= max`；`min > max` 即空范围
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightRange {
    pub min: f64,
    pub max: f64,
}

impl HighlightRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 解析 `"<min> <max>"`
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidBounds(input.trim().to_string());
        let mut parts = input.split_whitespace();
        let (Some(min), Some(max), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let min: f64 = min.parse().map_err(|_| invalid())?;
        let max: f64 = max.parse().map_err(|_| invalid())?;
        if !min.is_finite() || !max.is_finite() {
            return Err(invalid());
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl Display for HighlightRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_from_answer() {
        assert_eq!(RunMode::from_answer("d\n"), Some(RunMode::DownloadAndProcess));
        assert_eq!(RunMode::from_answer("p"), Some(RunMode::ProcessOnly));
        assert_eq!(RunMode::from_answer("x"), None);
        assert_eq!(RunMode::from_answer(""), None);
    }

    #[test]
    fn test_parse_bounds() {
        assert_eq!(HighlightRange::parse("6 7.5\n").unwrap(), HighlightRange::new(6.0, 7.5));
        assert_eq!(HighlightRange::parse("  5   6 ").unwrap(), HighlightRange::new(5.0, 6.0));
        assert!(HighlightRange::parse("6").is_err());
        assert!(HighlightRange::parse("6 7 8").is_err());
        assert!(HighlightRange::parse("seis 7").is_err());
        assert!(HighlightRange::parse("NaN 7").is_err());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = HighlightRange::new(6.0, 8.0);
        assert!(range.contains(6.0));
        assert!(range.contains(8.0));
        assert!(range.contains(7.3));
        assert!(!range.contains(5.0));
        assert!(!range.contains(9.0));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let range = HighlightRange::new(8.0, 6.0);
        assert!(range.is_empty());
        assert!(!range.contains(7.0));
        assert!(!range.contains(8.0));
    }
}
