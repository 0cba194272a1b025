use crate::entities::swift_code::{SwiftCode, PREFIX_LEN};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Result of an insert that must not overwrite an existing code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(SwiftCode),
    /// A record with the same code already exists. Expected, not a fault.
    Conflict,
}

/// Storage contract the registry is built against.
///
/// Every call is one unit of work; implementations provide their own
/// per-call atomicity and nothing more.
pub trait SwiftCodeRepository {
    /// Exact match on the uppercased code.
    fn find_by_code(&self, code: &str) -> rusqlite::Result<Option<SwiftCode>>;

    /// Records for the uppercased country code, ordered by code, with
    /// `skip` records dropped from the front and at most `limit` returned.
    fn find_by_country(
        &self,
        country_iso2: &str,
        skip: usize,
        limit: usize,
    ) -> rusqlite::Result<Vec<SwiftCode>>;

    /// Stored name of the country, if any record carries that country code.
    fn country_name(&self, country_iso2: &str) -> rusqlite::Result<Option<String>>;

    /// Non-headquarters records whose code starts with `prefix`.
    ///
    /// Returns an empty list when `prefix` is not exactly 8 characters.
    fn find_branches_by_prefix(&self, prefix: &str) -> rusqlite::Result<Vec<SwiftCode>>;

    fn insert_if_absent(&self, record: &SwiftCode) -> rusqlite::Result<InsertOutcome>;

    fn delete_by_code(&self, code: &str) -> rusqlite::Result<Option<SwiftCode>>;
}

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery. In-memory databases report
    // "memory" instead, which is fine.
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS swift_codes (
            swift_code TEXT PRIMARY KEY NOT NULL,
            bank_name TEXT NOT NULL,
            address TEXT,
            country_iso2 TEXT NOT NULL,
            country_name TEXT NOT NULL,
            is_headquarter INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_country_iso2 ON swift_codes(country_iso2)",
        [],
    )?;

    Ok(())
}

/// Open (or create) the database at `path` and make sure the schema exists.
pub fn open_database<P: AsRef<std::path::Path>>(path: P) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn verify_count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))
}

const COLUMNS: &str = "swift_code, bank_name, address, country_iso2, country_name, is_headquarter";

fn row_to_swift_code(row: &Row<'_>) -> rusqlite::Result<SwiftCode> {
    Ok(SwiftCode {
        swift_code: row.get(0)?,
        bank_name: row.get(1)?,
        address: row.get(2)?,
        country_iso2: row.get(3)?,
        country_name: row.get(4)?,
        is_headquarter: row.get(5)?,
    })
}

impl SwiftCodeRepository for Connection {
    fn find_by_code(&self, code: &str) -> rusqlite::Result<Option<SwiftCode>> {
        self.query_row(
            &format!("SELECT {COLUMNS} FROM swift_codes WHERE swift_code = ?1"),
            params![code.to_uppercase()],
            row_to_swift_code,
        )
        .optional()
    }

    fn find_by_country(
        &self,
        country_iso2: &str,
        skip: usize,
        limit: usize,
    ) -> rusqlite::Result<Vec<SwiftCode>> {
        let mut stmt = self.prepare(&format!(
            "SELECT {COLUMNS} FROM swift_codes
             WHERE country_iso2 = ?1
             ORDER BY swift_code
             LIMIT ?2 OFFSET ?3"
        ))?;

        let codes = stmt
            .query_map(
                params![country_iso2.to_uppercase(), limit as i64, skip as i64],
                row_to_swift_code,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(codes)
    }

    fn country_name(&self, country_iso2: &str) -> rusqlite::Result<Option<String>> {
        self.query_row(
            "SELECT country_name FROM swift_codes
             WHERE country_iso2 = ?1
             ORDER BY swift_code
             LIMIT 1",
            params![country_iso2.to_uppercase()],
            |row| row.get(0),
        )
        .optional()
    }

    fn find_branches_by_prefix(&self, prefix: &str) -> rusqlite::Result<Vec<SwiftCode>> {
        if prefix.chars().count() != PREFIX_LEN {
            return Ok(Vec::new());
        }

        let mut stmt = self.prepare(&format!(
            "SELECT {COLUMNS} FROM swift_codes
             WHERE substr(swift_code, 1, {PREFIX_LEN}) = ?1 AND is_headquarter = 0
             ORDER BY swift_code"
        ))?;

        let branches = stmt
            .query_map(params![prefix.to_uppercase()], row_to_swift_code)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(branches)
    }

    fn insert_if_absent(&self, record: &SwiftCode) -> rusqlite::Result<InsertOutcome> {
        let result = self.execute(
            &format!("INSERT INTO swift_codes ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                record.swift_code,
                record.bank_name,
                record.address,
                record.country_iso2,
                record.country_name,
                record.is_headquarter,
            ],
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Created(record.clone())),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(InsertOutcome::Conflict)
            }
            Err(e) => Err(e),
        }
    }

    fn delete_by_code(&self, code: &str) -> rusqlite::Result<Option<SwiftCode>> {
        self.query_row(
            &format!("DELETE FROM swift_codes WHERE swift_code = ?1 RETURNING {COLUMNS}"),
            params![code.to_uppercase()],
            row_to_swift_code,
        )
        .optional()
    }
}
