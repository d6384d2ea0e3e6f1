//! 分类结果：学校 → 年级 → 班级 三级映射，以及问题表格列表

use crate::models::table::TableInfo;
use serde::Serialize;
use std::collections::BTreeMap;

/// 三级分类映射
///
/// 同一个 (学校, 年级, 班级) 只保留一个文件名，后插入的覆盖先插入的
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryMap {
    schools: BTreeMap<String, BTreeMap<char, BTreeMap<char, String>>>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入文件名，返回被覆盖的旧文件名
    pub fn insert(&mut self, info: &TableInfo, table_name: impl Into<String>) -> Option<String> {
        self.schools
            .entry(info.school_id.clone())
            .or_default()
            .entry(info.year)
            .or_default()
            .insert(info.group, table_name.into())
    }

    pub fn get(&self, school_id: &str, year: char, group: char) -> Option<&str> {
        self.schools
            .get(school_id)?
            .get(&year)?
            .get(&group)
            .map(String::as_str)
    }

    /// 某个文件名是否出现在映射的任何分支中
    pub fn contains_table(&self, table_name: &str) -> bool {
        self.iter().any(|(_, _, _, name)| name == table_name)
    }

    pub fn schools(&self) -> impl Iterator<Item = &str> {
        self.schools.keys().map(String::as_str)
    }

    /// 按 学校、年级、班级 顺序遍历所有条目
    pub fn iter(&self) -> impl Iterator<Item = (&str, char, char, &str)> {
        self.schools.iter().flat_map(|(school, years)| {
            years.iter().flat_map(move |(year, groups)| {
                groups
                    .iter()
                    .map(move |(group, name)| (school.as_str(), *year, *group, name.as_str()))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }
}

/// 一个问题表格及其原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultyTable {
    pub name: String,
    pub reason: String,
}

/// 问题表格列表，按文件名去重，保持首次出现的顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FaultyTables {
    tables: Vec<FaultyTable>,
}

impl FaultyTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录问题表格；同名已存在时不重复记录，返回 false
    pub fn record(&mut self, name: impl Into<String>, reason: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.tables.push(FaultyTable {
            name,
            reason: reason.into(),
        });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FaultyTable> {
        self.tables.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
