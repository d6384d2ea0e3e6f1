pub mod annotate_flow;
pub mod categorizer;
pub mod table_ctx;

pub use annotate_flow::{annotate_file, AnnotateFlow};
pub use categorizer::{is_candidate, Categorization, Categorizer};
pub use table_ctx::TableCtx;
