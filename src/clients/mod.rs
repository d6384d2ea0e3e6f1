pub mod portal_client;

pub use portal_client::{DownloadOutcome, PortalClient};
