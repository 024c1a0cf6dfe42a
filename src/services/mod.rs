pub mod account;
pub mod export;

pub use account::{AccountSession, SessionDefaults, GUEST_ACCOUNT};
pub use export::{export_csv, export_csv_string, export_file_name, CSV_HEADER};
