//! 工作表版式 - 基础设施层
//!
//! calamine 只读出单元格值和合并区域；列宽、行高直接从 xlsx 包里的工作表 XML 读取

use crate::error::{TableError, TableResult};
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use zip::ZipArchive;

static SHEET_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<sheet\b[^>]*>").expect("sheet 正则无效"));

static RELATIONSHIP_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Relationship\b[^>]*>").expect("relationship 正则无效"));

static COL_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<col\b[^>]*>").expect("col 正则无效"));

static ROW_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<row\b[^>]*>").expect("row 正则无效"));

static XML_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([\w:]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("属性正则无效"));

// Excel 保存的列宽包含字体边距，写回时要去掉，否则每标注一次列就变宽一点
const CALIBRI_WIDTH_PADDING: f64 = 0.83203125;
const ALT_WIDTH_PADDING: f64 = 0.7109375;
const WIDTH_TOLERANCE: f64 = 0.0005;

/// 一段列宽相同的列（0 起始，两端包含）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnWidth {
    pub first_col: u16,
    pub last_col: u16,
    /// 字符宽度，已去掉 Excel 边距
    pub width: f64,
}

/// 自定义行高（0 起始行号，单位：磅）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowHeight {
    pub row: u32,
    pub height: f64,
}

/// 一个工作表的版式
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetDimensions {
    pub column_widths: Vec<ColumnWidth>,
    pub row_heights: Vec<RowHeight>,
}

/// 读出工作簿中每个工作表的列宽和行高，按工作表名索引
///
/// 包结构不完整时对应工作表没有版式信息，不视为错误
pub fn read_sheet_dimensions(path: &Path) -> TableResult<HashMap<String, SheetDimensions>> {
    let file = File::open(path).map_err(|e| TableError::io(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| TableError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let (Some(workbook_xml), Some(rels_xml)) = (
        read_part(&mut archive, "xl/workbook.xml"),
        read_part(&mut archive, "xl/_rels/workbook.xml.rels"),
    ) else {
        return Ok(HashMap::new());
    };

    let targets: HashMap<String, String> = RELATIONSHIP_TAG_RE
        .find_iter(&rels_xml)
        .filter_map(|tag| {
            let attrs = tag_attrs(tag.as_str());
            Some((attrs.get("Id")?.clone(), part_path(attrs.get("Target")?)))
        })
        .collect();

    let mut dimensions = HashMap::new();
    for tag in SHEET_TAG_RE.find_iter(&workbook_xml) {
        let attrs = tag_attrs(tag.as_str());
        let (Some(name), Some(rel_id)) = (attrs.get("name"), attrs.get("r:id")) else {
            continue;
        };
        let Some(sheet_xml) = targets.get(rel_id).and_then(|target| read_part(&mut archive, target)) else {
            continue;
        };
        dimensions.insert(name.clone(), parse_sheet_dimensions(&sheet_xml));
    }
    Ok(dimensions)
}

/// 从工作表 XML 中解析 `<col>` 和 `<row>` 的尺寸
pub fn parse_sheet_dimensions(sheet_xml: &str) -> SheetDimensions {
    let column_widths = COL_TAG_RE
        .find_iter(sheet_xml)
        .filter_map(|tag| {
            let attrs = tag_attrs(tag.as_str());
            let first: u16 = attrs.get("min")?.parse().ok()?;
            let last: u16 = attrs.get("max")?.parse().ok()?;
            let width: f64 = attrs.get("width")?.parse().ok()?;
            (first >= 1 && last >= first && width.is_finite()).then(|| ColumnWidth {
                first_col: first - 1,
                last_col: (last - 1).min(16_383),
                width: strip_excel_padding(width),
            })
        })
        .collect();

    let row_heights = ROW_TAG_RE
        .find_iter(sheet_xml)
        .filter_map(|tag| {
            let attrs = tag_attrs(tag.as_str());
            if !is_true(attrs.get("customHeight")) {
                return None;
            }
            let row: u32 = attrs.get("r")?.parse().ok()?;
            let height: f64 = attrs.get("ht")?.parse().ok()?;
            (row >= 1 && height.is_finite()).then(|| RowHeight { row: row - 1, height })
        })
        .collect();

    SheetDimensions {
        column_widths,
        row_heights,
    }
}

fn strip_excel_padding(raw: f64) -> f64 {
    let frac = raw % 1.0;
    for padding in [CALIBRI_WIDTH_PADDING, ALT_WIDTH_PADDING] {
        if (frac - padding).abs() < WIDTH_TOLERANCE && raw >= padding {
            return ((raw - padding) * 10_000.0).round() / 10_000.0;
        }
    }
    raw
}

/// 包内文件名不区分大小写，也接受反斜杠分隔
fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Option<String> {
    let pattern = name.replace('\\', "/");
    let stored = archive
        .file_names()
        .find(|file_name| pattern.eq_ignore_ascii_case(&file_name.replace('\\', "/")))?
        .to_owned();
    let mut part = archive.by_name(&stored).ok()?;
    let mut content = String::new();
    part.read_to_string(&mut content).ok()?;
    Some(content)
}

/// 关系中的 Target 相对于 `xl/`，以 `/` 开头时相对于包根目录
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn tag_attrs(tag: &str) -> HashMap<String, String> {
    XML_ATTR_RE
        .captures_iter(tag)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((name, unescape_xml(value)))
        })
        .collect()
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn is_true(value: Option<&String>) -> bool {
    matches!(value.map(String::as_str), Some("1") | Some("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sheet_dimensions() {
        let xml = r#"<worksheet><cols>
            <col min="2" max="2" width="30.7109375" customWidth="1"/>
            <col min="5" max="8" width="12.5" customWidth="1"/>
            </cols><sheetData>
            <row r="1" spans="1:6" ht="30" customHeight="1"><c r="A1" t="s"><v>0</v></c></row>
            <row r="2" ht="15"></row>
            </sheetData></worksheet>"#;

        let dims = parse_sheet_dimensions(xml);
        assert_eq!(
            dims.column_widths,
            vec![
                ColumnWidth {
                    first_col: 1,
                    last_col: 1,
                    width: 30.0
                },
                ColumnWidth {
                    first_col: 4,
                    last_col: 7,
                    width: 12.5
                },
            ]
        );
        assert_eq!(dims.row_heights, vec![RowHeight { row: 0, height: 30.0 }]);
    }

    #[test]
    fn test_strip_excel_padding() {
        assert_eq!(strip_excel_padding(9.140625), 9.140625);
        assert_eq!(strip_excel_padding(8.7109375), 8.0);
        assert_eq!(strip_excel_padding(10.83203125), 10.0);
        assert_eq!(strip_excel_padding(0.5), 0.5);
    }

    #[test]
    fn test_part_path() {
        assert_eq!(part_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(part_path("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_sheet_name_entities_are_decoded() {
        let attrs = tag_attrs(r#"<sheet name="Notas &amp; faltas" sheetId="2" r:id="rId2"/>"#);
        assert_eq!(attrs.get("name").map(String::as_str), Some("Notas & faltas"));
        assert_eq!(attrs.get("r:id").map(String::as_str), Some("rId2"));
    }
}
