pub mod annotation;
pub mod category;
pub mod credential;
pub mod download;
pub mod highlight;
pub mod loaders;
pub mod region;
pub mod table;

pub use annotation::{AnnotationReport, ColumnSpan, HighlightRule, MarkedCell};
pub use category::{CategoryMap, FaultyTable, FaultyTables};
pub use credential::Credential;
pub use download::{DownloadFailure, DownloadReport};
pub use highlight::{HighlightRange, RunMode};
pub use loaders::{list_table_names, load_credentials, TableListing};
pub use region::{column_index, column_name, AnnotationRegion, ColumnRole, PeriodBlock, RegionLayout};
pub use table::{TableFile, TableInfo};
