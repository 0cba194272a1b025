use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use swift_registry::{
    config, create_swift_code, delete_swift_code, get_swift_code, import_file, init_tracing,
    list_country, open_database, verify_count, Config, NewSwiftCode, Page,
};

#[derive(Parser)]
#[command(name = "swift-registry", version, about = "SWIFT/BIC code registry")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bulk import from a spreadsheet (xlsx or csv)
    Import {
        /// Source file; defaults to the configured data path
        path: Option<PathBuf>,
    },
    /// Show one code; headquarters include their branches
    Get { swift_code: String },
    /// List a country's codes
    Country {
        country_iso2: String,
        #[arg(long, default_value_t = 0)]
        skip: i64,
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },
    /// Add a single code
    Add {
        swift_code: String,
        #[arg(long)]
        bank_name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        country_iso2: String,
        #[arg(long)]
        country_name: String,
    },
    /// Delete a code
    Delete { swift_code: String },
}

fn main() -> Result<()> {
    let dotenv = config::load_dotenv();
    init_tracing();
    if let Some(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let cli = Cli::parse();
    let conn = open_database(&cli.config.database_path).with_context(|| {
        format!("Failed to open database {}", cli.config.database_path.display())
    })?;

    match cli.command {
        Command::Import { path } => {
            let path = path.unwrap_or_else(|| cli.config.data_path.clone());
            let summary = import_file(&conn, &path)
                .with_context(|| format!("Failed to import {}", path.display()))?;

            println!("{}", summary.summary());
            println!("Database contains {} SWIFT codes", verify_count(&conn)?);
        }
        Command::Get { swift_code } => {
            let view = get_swift_code(&conn, &swift_code)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Country {
            country_iso2,
            skip,
            limit,
        } => {
            let listing = list_country(&conn, &country_iso2, Page { skip, limit })?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::Add {
            swift_code,
            bank_name,
            address,
            country_iso2,
            country_name,
        } => {
            let created = create_swift_code(
                &conn,
                NewSwiftCode {
                    swift_code,
                    bank_name,
                    address,
                    country_iso2,
                    country_name,
                    is_headquarter: None,
                },
            )?;
            println!("SWIFT code '{}' created successfully.", created.swift_code);
        }
        Command::Delete { swift_code } => {
            let deleted = delete_swift_code(&conn, &swift_code)?;
            println!("SWIFT code '{}' deleted successfully.", deleted.swift_code);
        }
    }

    Ok(())
}
