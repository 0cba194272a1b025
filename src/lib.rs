// SWIFT Code Registry - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod import;
pub mod parser;
pub mod registry;
pub mod schema;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use db::{open_database, setup_database, verify_count, InsertOutcome, SwiftCodeRepository};
pub use entities::{
    institution_prefix, is_headquarters, resolve_view, BranchView, CountryListing, NewSwiftCode,
    SwiftCode, SwiftCodeView,
};
pub use error::{IngestError, RegistryError, RegistryResult};
pub use import::{import_file, import_rows, ImportSummary};
pub use parser::{detect_format, get_parser, parse_swift_data, RawSwiftRow, SourceFormat, SourceParser};
pub use registry::{create_swift_code, delete_swift_code, get_swift_code, list_country, Page};
pub use schema::{ValidationError, ValidationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the fmt subscriber used by both binaries.
///
/// `RUST_LOG` wins when set.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,swift_registry=debug".into()),
        )
        .init();
}
