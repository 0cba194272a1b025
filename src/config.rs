// Process configuration.
//
// Built once at startup by the binaries and passed down explicitly. Library
// code never reads the environment itself.

use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "swift_codes.db";
pub const DEFAULT_DATA_PATH: &str = "data/swift_codes.xlsx";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Config {
    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
    pub database_path: PathBuf,

    /// Spreadsheet used by bulk import
    #[arg(long, env = "EXCEL_FILE_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// Load `.env` if one exists and return its path. Missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}
