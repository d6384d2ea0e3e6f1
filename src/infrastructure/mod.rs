pub mod sheet_layout;
pub mod workbook_io;

pub use sheet_layout::{ColumnWidth, RowHeight, SheetDimensions};
pub use workbook_io::{check_readable, save_annotated, HighlightStyle, LoadedWorkbook, SheetData};
