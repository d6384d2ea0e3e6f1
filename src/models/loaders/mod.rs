pub mod credentials_loader;
pub mod directory_loader;

pub use credentials_loader::{load_credentials, parse_credentials};
pub use directory_loader::{list_table_names, TableListing};
