// Registry operations: get by code, list by country, create, delete.
//
// Transport-independent. Each function takes the repository explicitly and
// issues one repository call per step; nothing here holds state between calls.

use crate::db::{InsertOutcome, SwiftCodeRepository};
use crate::entities::{resolve_view, CountryListing, NewSwiftCode, SwiftCode, SwiftCodeView};
use crate::error::{RegistryError, RegistryResult};
use crate::schema::{self, DEFAULT_PAGE_LIMIT};
use tracing::{debug, error, info};

/// Pagination window for a country listing, as received from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Look up one code. Headquarters views embed their branches.
///
/// `code` must already be in canonical form; no case folding happens here.
pub fn get_swift_code<R: SwiftCodeRepository>(repo: &R, code: &str) -> RegistryResult<SwiftCodeView> {
    schema::check_swift_code(code).map_err(invalid)?;

    let record = repo
        .find_by_code(code)?
        .ok_or_else(|| RegistryError::NotFound("SWIFT code not found".to_string()))?;

    debug!(swift_code = %record.swift_code, hq = record.is_headquarter, "resolved swift code");

    let view = resolve_view(record, |prefix| repo.find_branches_by_prefix(prefix))?;
    Ok(view)
}

/// List one page of a country's records.
///
/// An empty page for a country that has records elsewhere is a success with
/// the stored country name. A country with no records at all is NotFound.
pub fn list_country<R: SwiftCodeRepository>(
    repo: &R,
    country_iso2: &str,
    page: Page,
) -> RegistryResult<CountryListing> {
    schema::check_country_iso2(country_iso2).map_err(invalid)?;
    let (skip, limit) = schema::check_page(page.skip, page.limit)?;
    let country = country_iso2.to_string();

    let swift_codes = repo.find_by_country(&country, skip, limit)?;

    let country_name = match swift_codes.first() {
        Some(first) => first.country_name.clone(),
        None => repo.country_name(&country)?.ok_or_else(|| {
            RegistryError::NotFound("Country ISO2 code not found in database".to_string())
        })?,
    };

    Ok(CountryListing {
        country_iso2: country,
        country_name,
        swift_codes,
    })
}

/// Validate, classify and persist a new record.
pub fn create_swift_code<R: SwiftCodeRepository>(
    repo: &R,
    input: NewSwiftCode,
) -> RegistryResult<SwiftCode> {
    let normalized = schema::normalize_new_swift_code(input)?;
    let record = SwiftCode::from_new(normalized);

    match repo.insert_if_absent(&record) {
        Ok(InsertOutcome::Created(created)) => {
            info!(swift_code = %created.swift_code, hq = created.is_headquarter, "created swift code");
            Ok(created)
        }
        Ok(InsertOutcome::Conflict) => Err(RegistryError::Conflict(format!(
            "SWIFT code '{}' already exists.",
            record.swift_code
        ))),
        Err(e) => {
            error!(swift_code = %record.swift_code, error = %e, "failed to create swift code");
            Err(RegistryError::Storage(format!(
                "Could not create SWIFT code '{}'. Database error occurred.",
                record.swift_code
            )))
        }
    }
}

/// Remove a record by code.
///
/// A storage failure is reported exactly like a missing record.
pub fn delete_swift_code<R: SwiftCodeRepository>(repo: &R, code: &str) -> RegistryResult<SwiftCode> {
    schema::check_swift_code(code).map_err(invalid)?;

    let not_found =
        || RegistryError::NotFound("SWIFT code not found or error during deletion.".to_string());

    match repo.delete_by_code(code) {
        Ok(Some(deleted)) => {
            info!(swift_code = %deleted.swift_code, "deleted swift code");
            Ok(deleted)
        }
        Ok(None) => Err(not_found()),
        Err(e) => {
            error!(swift_code = %code, error = %e, "failed to delete swift code");
            Err(not_found())
        }
    }
}

fn invalid(err: schema::ValidationError) -> RegistryError {
    RegistryError::Validation(vec![err])
}
