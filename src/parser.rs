// 🏗️ Bulk Source Parsers
// Reads the SWIFT directory export (xlsx or csv) into cleaned rows.
//
// Only the five mapped columns are read; anything else in the sheet is
// ignored. Cleaning here is stricter than interactive validation: rows with
// empty required fields are dropped.

use crate::entities::NewSwiftCode;
use crate::error::IngestError;
use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

// ============================================================================
// COLUMN MAPPING
// ============================================================================

pub const COL_COUNTRY_ISO2: &str = "COUNTRY ISO2 CODE";
pub const COL_SWIFT_CODE: &str = "SWIFT CODE";
pub const COL_NAME: &str = "NAME";
pub const COL_ADDRESS: &str = "ADDRESS";
pub const COL_COUNTRY_NAME: &str = "COUNTRY NAME";

/// Required headers, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_COUNTRY_ISO2,
    COL_SWIFT_CODE,
    COL_NAME,
    COL_ADDRESS,
    COL_COUNTRY_NAME,
];

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Xlsx,
    Csv,
}

impl SourceFormat {
    pub fn name(&self) -> &str {
        match self {
            SourceFormat::Xlsx => "Excel workbook",
            SourceFormat::Csv => "CSV",
        }
    }
}

/// One row of the source, already column-mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSwiftRow {
    pub country_iso2: String,
    pub swift_code: String,
    pub bank_name: String,
    pub address: String,
    pub country_name: String,
}

impl From<RawSwiftRow> for NewSwiftCode {
    fn from(row: RawSwiftRow) -> Self {
        NewSwiftCode {
            swift_code: row.swift_code,
            bank_name: row.bank_name,
            address: Some(row.address),
            country_iso2: row.country_iso2,
            country_name: row.country_name,
            is_headquarter: None,
        }
    }
}

// ============================================================================
// PARSER TRAIT
// ============================================================================

pub trait SourceParser {
    /// Header row plus data rows, every cell as a string exactly as stored.
    fn read_table(&self, file_path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), IngestError>;

    fn format(&self) -> SourceFormat;

    /// Read, map and clean every row of the source.
    fn parse(&self, file_path: &Path) -> Result<Vec<RawSwiftRow>, IngestError> {
        let (headers, rows) = self.read_table(file_path)?;
        let columns = map_columns(&headers)?;

        let total = rows.len();
        let cleaned: Vec<RawSwiftRow> = rows
            .iter()
            .map(|row| columns.extract(row))
            .filter_map(clean_row)
            .collect();

        debug!(
            format = self.format().name(),
            total,
            kept = cleaned.len(),
            "parsed bulk source"
        );

        Ok(cleaned)
    }
}

/// Detect the source format from the file extension.
pub fn detect_format(file_path: &Path) -> Result<SourceFormat, IngestError> {
    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Xlsx),
        "csv" => Ok(SourceFormat::Csv),
        _ => Err(IngestError::UnsupportedFormat(file_path.display().to_string())),
    }
}

pub fn get_parser(format: SourceFormat) -> Box<dyn SourceParser> {
    match format {
        SourceFormat::Xlsx => Box::new(XlsxParser),
        SourceFormat::Csv => Box::new(CsvParser),
    }
}

/// Detect the format of `file_path` and parse it.
///
/// A missing file is reported before the extension is looked at.
pub fn parse_swift_data(file_path: &Path) -> Result<Vec<RawSwiftRow>, IngestError> {
    if !file_path.exists() {
        return Err(IngestError::FileNotFound(file_path.to_path_buf()));
    }
    let format = detect_format(file_path)?;
    get_parser(format).parse(file_path)
}

// ============================================================================
// COLUMN INDEX
// ============================================================================

/// Positions of the five required columns within a header row.
#[derive(Debug, Clone, Copy)]
pub struct ColumnIndex {
    country_iso2: usize,
    swift_code: usize,
    bank_name: usize,
    address: usize,
    country_name: usize,
}

impl ColumnIndex {
    fn extract(&self, row: &[String]) -> RawSwiftRow {
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();

        RawSwiftRow {
            country_iso2: cell(self.country_iso2),
            swift_code: cell(self.swift_code),
            bank_name: cell(self.bank_name),
            address: cell(self.address),
            country_name: cell(self.country_name),
        }
    }
}

/// Locate the required columns, reporting every missing one at once.
pub fn map_columns(headers: &[String]) -> Result<ColumnIndex, IngestError> {
    let positions: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, h)| (h.trim(), idx))
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !positions.contains_key(*col))
        .map(|col| col.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(IngestError::MissingColumns(missing));
    }

    let at = |col: &str| positions.get(col).copied().unwrap_or_default();

    Ok(ColumnIndex {
        country_iso2: at(COL_COUNTRY_ISO2),
        swift_code: at(COL_SWIFT_CODE),
        bank_name: at(COL_NAME),
        address: at(COL_ADDRESS),
        country_name: at(COL_COUNTRY_NAME),
    })
}

// ============================================================================
// CLEANING
// ============================================================================

/// Normalize case and drop rows that cannot be a record.
///
/// Code, country code and country name are trimmed and uppercased; bank name
/// and address are kept as stored. A row is dropped when
/// the code is not 8 or 11 characters, the country code is not 2 characters,
/// or any of code, country code, country name, bank name is empty.
pub fn clean_row(row: RawSwiftRow) -> Option<RawSwiftRow> {
    let row = RawSwiftRow {
        country_iso2: row.country_iso2.trim().to_uppercase(),
        swift_code: row.swift_code.trim().to_uppercase(),
        bank_name: row.bank_name,
        address: row.address,
        country_name: row.country_name.trim().to_uppercase(),
    };

    let code_len = row.swift_code.chars().count();
    if code_len != 8 && code_len != 11 {
        return None;
    }
    if row.country_iso2.chars().count() != 2 {
        return None;
    }
    if row.country_name.is_empty() || row.bank_name.is_empty() {
        return None;
    }

    Some(row)
}

// ============================================================================
// XLSX PARSER
// ============================================================================

/// Reads the first worksheet of a workbook.
pub struct XlsxParser;

impl SourceParser for XlsxParser {
    fn read_table(&self, file_path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), IngestError> {
        let mut workbook = open_workbook_auto(file_path)?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| IngestError::Read("workbook has no worksheets".to_string()))??;

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header_row) => header_row.iter().map(cell_to_string).collect(),
            None => Vec::new(),
        };

        let data = rows
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok((headers, data))
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::Xlsx
    }
}

/// Cell as a string; blanks and error cells become "".
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            // Whole numbers without the trailing ".0"
            if *f == f.floor() && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

// ============================================================================
// CSV PARSER
// ============================================================================

pub struct CsvParser;

impl SourceParser for CsvParser {
    fn read_table(&self, file_path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(file_path)?;

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut data = Vec::new();
        for result in reader.records() {
            let record = result?;
            data.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok((headers, data))
    }

    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }
}

// ============================================================================
// TESTS
// ============================================================================
