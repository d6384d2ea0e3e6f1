//! 文件名分类 - 业务能力层
//!
//! 文件名语法：
//!
//! ```text
//! name     = school "_" rest
//! school   = 1*( ASCII 字母 | 数字 )
//! rest     = *任意字符 token *任意字符
//! token    = DQUOTE DIGIT ALPHA DQUOTE      ; 例如 "1A"，取第一个匹配
//! ```
//!
//! `year` 取 token 中的数字，`group` 取 token 中的字母。

use crate::error::{TableError, TableResult};
use crate::models::TableInfo;
use regex::Regex;
use std::sync::LazyLock;

static SCHOOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-Za-z]+)_").expect("学校标识正则无效"));

static CLASS_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([0-9])([A-Za-z])""#).expect("年级班级正则无效"));

/// 从文件名解析 (学校, 年级, 班级)
///
/// 任何一部分缺失都返回 `NameFormat` 错误，不会返回部分结果
pub fn classify(file_name: &str) -> TableResult<TableInfo> {
    let name_error = |reason: &str| TableError::NameFormat {
        name: file_name.to_string(),
        reason: reason.to_string(),
    };

    let school_id = SCHOOL_RE
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| name_error("缺少以下划线结尾的学校标识"))?;

    let caps = CLASS_TOKEN_RE
        .captures(file_name)
        .ok_or_else(|| name_error("缺少带引号的年级班级标记，例如 \"1A\""))?;
    let year = caps.get(1).and_then(|m| m.as_str().chars().next());
    let group = caps.get(2).and_then(|m| m.as_str().chars().next());

    match (year, group) {
        (Some(year), Some(group)) => Ok(TableInfo {
            school_id,
            year,
            group,
        }),
        _ => Err(name_error("年级班级标记不完整")),
    }
}
