// Bulk import: cleaned source rows -> registry.
//
// A bad row never aborts the batch. Each row ends up in exactly one bucket:
// added, skipped (invalid or already present) or failed (storage fault).

use crate::db::{InsertOutcome, SwiftCodeRepository};
use crate::entities::SwiftCode;
use crate::error::IngestError;
use crate::parser::{parse_swift_data, RawSwiftRow};
use crate::schema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.added + self.skipped + self.failed
    }

    pub fn summary(&self) -> String {
        format!(
            "Data loading complete. Added: {}, Skipped (existing or validation error): {}, DB Errors: {}.",
            self.added, self.skipped, self.failed
        )
    }
}

/// Load already-cleaned rows into the repository.
pub fn import_rows<R, I>(repo: &R, rows: I) -> ImportSummary
where
    R: SwiftCodeRepository,
    I: IntoIterator<Item = RawSwiftRow>,
{
    let mut summary = ImportSummary::default();

    for row in rows {
        let raw_code = row.swift_code.clone();

        let normalized = match schema::normalize_new_swift_code(row.into()) {
            Ok(normalized) => normalized,
            Err(errors) => {
                let reasons: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                warn!(swift_code = %raw_code, reasons = %reasons.join("; "), "skipping invalid row");
                summary.skipped += 1;
                continue;
            }
        };

        match repo.find_by_code(&normalized.swift_code) {
            Ok(Some(_)) => {
                summary.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                error!(swift_code = %normalized.swift_code, error = %e, "lookup failed during import");
                summary.failed += 1;
                continue;
            }
        }

        let record = SwiftCode::from_new(normalized);
        match repo.insert_if_absent(&record) {
            Ok(InsertOutcome::Created(_)) => summary.added += 1,
            Ok(InsertOutcome::Conflict) => summary.skipped += 1,
            Err(e) => {
                error!(swift_code = %record.swift_code, error = %e, "failed to add swift code");
                summary.failed += 1;
            }
        }
    }

    info!(
        added = summary.added,
        skipped = summary.skipped,
        failed = summary.failed,
        "import finished"
    );

    summary
}

/// Parse the source file at `path` and import every surviving row.
pub fn import_file<R: SwiftCodeRepository>(repo: &R, path: &Path) -> Result<ImportSummary, IngestError> {
    info!(path = %path.display(), "loading swift data");

    let rows = parse_swift_data(path)?;
    info!(rows = rows.len(), "parsed records from file");

    Ok(import_rows(repo, rows))
}
