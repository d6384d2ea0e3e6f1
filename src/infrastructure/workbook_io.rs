//! 工作簿读写 - 基础设施层
//!
//! 只暴露"读出工作表"和"写出标注后的工作簿"两种能力，
//! 不认识学生、周期、评分规则

use super::sheet_layout::{read_sheet_dimensions, SheetDimensions};
use crate::error::{ConfigError, TableError, TableResult};
use crate::models::AnnotationReport;
use calamine::{open_workbook, Data, Dimensions, Range, Reader, Xlsx};
use rust_xlsxwriter::{
    Color, ConditionalFormatCell, ConditionalFormatCellRule, Format, Workbook, Worksheet, XlsxError,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 一个工作表：单元格值、合并区域、列宽和行高
#[derive(Debug, Clone)]
pub struct SheetData {
    pub name: String,
    pub range: Range<Data>,
    pub merges: Vec<Dimensions>,
    pub layout: SheetDimensions,
}

/// 读入内存的工作簿
///
/// 第一个工作表视为活动工作表
#[derive(Debug, Clone)]
pub struct LoadedWorkbook {
    pub path: PathBuf,
    pub active: SheetData,
    pub others: Vec<SheetData>,
}

impl LoadedWorkbook {
    /// 打开工作簿并读出所有工作表
    pub fn open(path: &Path) -> TableResult<Self> {
        let mut workbook = open_workbook::<Xlsx<_>, _>(path).map_err(|e| parse_error(path, e))?;
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let mut layouts = read_sheet_dimensions(path).unwrap_or_else(|e| {
            warn!("⚠️ 无法读取列宽和行高，按默认尺寸输出: {}", e);
            Default::default()
        });

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| parse_error(path, e))?;
            let merges = workbook
                .worksheet_merge_cells(&name)
                .transpose()
                .map_err(|e| parse_error(path, e))?
                .unwrap_or_default();
            let layout = layouts.remove(&name).unwrap_or_default();
            sheets.push(SheetData {
                name,
                range,
                merges,
                layout,
            });
        }

        let mut sheets = sheets.into_iter();
        let active = sheets.next().ok_or_else(|| TableError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            active,
            others: sheets.collect(),
        })
    }

    /// 按原顺序遍历所有工作表
    pub fn sheets(&self) -> impl Iterator<Item = &SheetData> {
        std::iter::once(&self.active).chain(self.others.iter())
    }
}

/// 只检查文件能否按表格打开：所有工作表都能读出，且至少有一个工作表
pub fn check_readable(path: &Path) -> TableResult<()> {
    LoadedWorkbook::open(path).map(|_| ())
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> TableError {
    TableError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// 高亮样式（纯色填充）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightStyle {
    pub rgb: u32,
}

impl HighlightStyle {
    /// 解析 `FFFF00` 或 `#FFFF00`
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ConfigError::InvalidColor(hex.to_string()));
        }
        let rgb = u32::from_str_radix(digits, 16).map_err(|_| ConfigError::InvalidColor(hex.to_string()))?;
        Ok(Self { rgb })
    }

    fn fill(&self) -> Format {
        Format::new().set_background_color(Color::RGB(self.rgb))
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self { rgb: 0xFFFF00 }
    }
}

const DATE_FORMAT: &str = "yyyy-mm-dd";

/// 写出标注后的工作簿
///
/// 保留所有工作表的单元格值、合并区域、列宽和行高；
/// 只有活动工作表上的标记单元格被填充颜色，并附加平均分列的条件格式
pub fn save_annotated(
    workbook: &LoadedWorkbook,
    report: &AnnotationReport,
    style: &HighlightStyle,
    output_path: &Path,
) -> TableResult<()> {
    let to_err = |e: XlsxError| TableError::Workbook {
        path: output_path.to_path_buf(),
        message: e.to_string(),
    };

    let fill = style.fill();
    let marked = report.marked_cells();
    let none = HashSet::new();
    let mut output = Workbook::new();

    for (index, sheet) in workbook.sheets().enumerate() {
        let worksheet = output.add_worksheet();
        worksheet.set_name(&sheet.name).map_err(to_err)?;

        copy_layout(worksheet, sheet).map_err(to_err)?;

        let is_active = index == 0;
        let marks = if is_active { &marked } else { &none };
        copy_cells(worksheet, &sheet.range, marks, &fill).map_err(to_err)?;

        if is_active {
            // 超出原数据范围或原本为空的标记单元格，写入带填充的空白格
            for &(row, col) in marks {
                if is_blank_at(&sheet.range, row, col) {
                    worksheet.write_blank(row, col, &fill).map_err(to_err)?;
                }
            }

            for span in &report.average_spans {
                let rule = ConditionalFormatCell::new()
                    .set_rule(ConditionalFormatCellRule::Between(report.bounds.min, report.bounds.max))
                    .set_format(&fill);
                worksheet
                    .add_conditional_format(span.first_row, span.col, span.last_row, span.col, &rule)
                    .map_err(to_err)?;
            }
        }
    }

    output.save(output_path).map_err(to_err)?;
    debug!("已写出标注表格: {}", output_path.display());
    Ok(())
}

/// 合并区域要在单元格值之前写入，否则首格的值会被合并时写入的空白覆盖
fn copy_layout(worksheet: &mut Worksheet, sheet: &SheetData) -> Result<(), XlsxError> {
    for width in &sheet.layout.column_widths {
        worksheet.set_column_range_width(width.first_col, width.last_col, width.width)?;
    }
    for height in &sheet.layout.row_heights {
        worksheet.set_row_height(height.row, height.height)?;
    }

    let plain = Format::new();
    for region in &sheet.merges {
        let (first_row, first_col) = region.start;
        let (last_row, last_col) = region.end;
        if (first_row, first_col) == (last_row, last_col) {
            continue;
        }
        let (Ok(first_col), Ok(last_col)) = (u16::try_from(first_col), u16::try_from(last_col)) else {
            continue;
        };
        worksheet.merge_range(first_row, first_col, last_row, last_col, "", &plain)?;
    }
    Ok(())
}

fn is_blank_at(range: &Range<Data>, row: u32, col: u16) -> bool {
    matches!(range.get_value((row, u32::from(col))), None | Some(Data::Empty))
}

fn copy_cells(
    worksheet: &mut Worksheet,
    range: &Range<Data>,
    marks: &HashSet<(u32, u16)>,
    fill: &Format,
) -> Result<(), XlsxError> {
    let Some((start_row, start_col)) = range.start() else {
        return Ok(());
    };

    for (r, c, value) in range.cells() {
        let row = start_row + r as u32;
        let Ok(col) = u16::try_from(start_col as usize + c) else {
            continue;
        };
        let format = marks.contains(&(row, col)).then_some(fill);
        write_value(worksheet, row, col, value, format)?;
    }
    Ok(())
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Data,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match value {
        Data::Empty => {}
        Data::Int(n) => write_number(worksheet, row, col, *n as f64, format)?,
        Data::Float(n) => write_number(worksheet, row, col, *n, format)?,
        Data::String(s) => write_string(worksheet, row, col, s, format)?,
        Data::Bool(b) => match format {
            Some(f) => {
                worksheet.write_boolean_with_format(row, col, *b, f)?;
            }
            None => {
                worksheet.write_boolean(row, col, *b)?;
            }
        },
        Data::DateTime(dt) => {
            let date = match format {
                Some(f) => f.clone().set_num_format(DATE_FORMAT),
                None => Format::new().set_num_format(DATE_FORMAT),
            };
            worksheet.write_number_with_format(row, col, dt.as_f64(), &date)?;
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => write_string(worksheet, row, col, s, format)?,
        Data::Error(e) => write_string(worksheet, row, col, &e.to_string(), format)?,
    }
    Ok(())
}

fn write_number(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: f64,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match format {
        Some(f) => worksheet.write_number_with_format(row, col, value, f)?,
        None => worksheet.write_number(row, col, value)?,
    };
    Ok(())
}

fn write_string(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &str,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match format {
        Some(f) => worksheet.write_string_with_format(row, col, value, f)?,
        None => worksheet.write_string(row, col, value)?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_style_from_hex() {
        assert_eq!(HighlightStyle::from_hex("FFFF00").unwrap().rgb, 0xFFFF00);
        assert_eq!(HighlightStyle::from_hex("#ffc7ce").unwrap().rgb, 0xFFC7CE);
        assert!(HighlightStyle::from_hex("FFF").is_err());
        assert!(HighlightStyle::from_hex("GGGGGG").is_err());
    }

    #[test]
    fn test_check_readable_rejects_non_spreadsheet() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("A_roto_\"1A\".xlsx");
        std::fs::write(&path, "esto no es un xlsx").unwrap();

        assert!(matches!(check_readable(&path), Err(TableError::Parse { .. })));
        assert!(LoadedWorkbook::open(&path).is_err());
    }

    #[test]
    fn test_open_reads_all_sheets_in_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("libro.xlsx");

        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .set_name("Concentrado")
            .unwrap()
            .write_string(0, 0, "Escuela")
            .unwrap();
        workbook
            .add_worksheet()
            .set_name("Notas")
            .unwrap()
            .write_number(1, 1, 7.5)
            .unwrap();
        workbook.save(&path).unwrap();

        check_readable(&path).unwrap();
        let loaded = LoadedWorkbook::open(&path).unwrap();
        let names: Vec<&str> = loaded.sheets().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Concentrado", "Notas"]);
        assert_eq!(
            loaded.active.range.get_value((0, 0)),
            Some(&Data::String("Escuela".to_string()))
        );
    }

    #[test]
    fn test_save_keeps_merges_widths_and_heights() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("con_formato.xlsx");
        let output = dir.path().join("salida.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet().set_name("Concentrado").unwrap();
        sheet.merge_range(0, 0, 0, 5, "Titulo", &Format::new()).unwrap();
        sheet.set_column_width(1, 30).unwrap();
        sheet.set_row_height(0, 28).unwrap();
        sheet.write_number(12, 0, 1).unwrap();
        workbook.save(&input).unwrap();

        let loaded = LoadedWorkbook::open(&input).unwrap();
        assert_eq!(loaded.active.merges.len(), 1);

        let report = AnnotationReport {
            pupil_count: 1,
            marks: Vec::new(),
            average_spans: Vec::new(),
            bounds: crate::models::HighlightRange::new(6.0, 8.0),
        };
        save_annotated(&loaded, &report, &HighlightStyle::default(), &output).unwrap();

        let reopened = LoadedWorkbook::open(&output).unwrap();
        let merges: Vec<((u32, u32), (u32, u32))> =
            reopened.active.merges.iter().map(|d| (d.start, d.end)).collect();
        assert_eq!(merges, vec![((0, 0), (0, 5))]);
        assert_eq!(
            reopened.active.range.get_value((0, 0)),
            Some(&Data::String("Titulo".to_string()))
        );

        let widths = &reopened.active.layout.column_widths;
        assert_eq!(widths.len(), 1);
        assert_eq!((widths[0].first_col, widths[0].last_col), (1, 1));
        assert_eq!(widths[0].width, 30.0);
        assert_eq!(reopened.active.layout.row_heights[0].row, 0);
        assert_eq!(reopened.active.layout.row_heights[0].height, 28.0);
    }
}
