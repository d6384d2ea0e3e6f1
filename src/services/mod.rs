pub mod annotator;
pub mod classifier;
pub mod validator;
pub mod warn_writer;

pub use annotator::Annotator;
pub use classifier::classify;
pub use validator::{TableCheck, TableValidator};
pub use warn_writer::WarnWriter;
