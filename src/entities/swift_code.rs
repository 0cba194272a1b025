// 🏦 SWIFT Code Entity - headquarters/branch classification
//
// A code's headquarters status is a pure function of the code itself, and the
// headquarters -> branches relationship is a structural one: a branch shares
// the first 8 characters (the institution prefix) with its headquarters.
// Nothing here stores links between records; branches are joined at read time.

use serde::{Deserialize, Serialize};

/// Suffix that marks an 11-character code as a headquarters entry.
pub const HEADQUARTERS_SUFFIX: &str = "XXX";

/// Length of the institution prefix shared by a headquarters and its branches.
pub const PREFIX_LEN: usize = 8;

// ============================================================================
// CLASSIFIER
// ============================================================================

/// True iff `code` ends with `XXX`.
///
/// Expects an already uppercased code.
pub fn is_headquarters(code: &str) -> bool {
    code.ends_with(HEADQUARTERS_SUFFIX)
}

/// First 8 characters of `code`, or `None` when the code is shorter than that.
pub fn institution_prefix(code: &str) -> Option<&str> {
    code.get(..PREFIX_LEN)
}

// ============================================================================
// RECORDS
// ============================================================================

/// A stored SWIFT/BIC record.
///
/// `is_headquarter` is always derived from `swift_code` when the record is
/// built from caller input; see [`SwiftCode::from_new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCode {
    pub swift_code: String,
    pub bank_name: String,
    pub address: Option<String>,
    pub country_iso2: String,
    pub country_name: String,
    pub is_headquarter: bool,
}

/// Caller-supplied record, before validation.
///
/// `is_headquarter` is accepted so clients may send it, but it never reaches
/// storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSwiftCode {
    pub swift_code: String,
    pub bank_name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub country_iso2: String,
    pub country_name: String,
    #[serde(default)]
    pub is_headquarter: Option<bool>,
}

impl SwiftCode {
    /// Build the record to persist from validated input.
    ///
    /// The headquarters flag comes from the code; whatever the caller sent is
    /// dropped.
    pub fn from_new(input: NewSwiftCode) -> Self {
        let is_headquarter = is_headquarters(&input.swift_code);

        SwiftCode {
            swift_code: input.swift_code,
            bank_name: input.bank_name,
            address: input.address,
            country_iso2: input.country_iso2,
            country_name: input.country_name,
            is_headquarter,
        }
    }

    /// Institution prefix of this record's code.
    pub fn prefix(&self) -> Option<&str> {
        institution_prefix(&self.swift_code)
    }

    /// True if `other` is a branch of this headquarters record.
    pub fn has_branch(&self, other: &SwiftCode) -> bool {
        if !self.is_headquarter || self.swift_code.len() != 11 || other.is_headquarter {
            return false;
        }

        match (self.prefix(), other.prefix()) {
            (Some(hq), Some(branch)) => hq == branch,
            _ => false,
        }
    }
}

// ============================================================================
// VIEWS
// ============================================================================

/// Branch entry embedded in a headquarters response. Omits `country_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchView {
    pub swift_code: String,
    pub bank_name: String,
    pub address: Option<String>,
    pub country_iso2: String,
    pub is_headquarter: bool,
}

impl From<SwiftCode> for BranchView {
    fn from(code: SwiftCode) -> Self {
        BranchView {
            swift_code: code.swift_code,
            bank_name: code.bank_name,
            address: code.address,
            country_iso2: code.country_iso2,
            is_headquarter: code.is_headquarter,
        }
    }
}

/// Response shape for a single-code lookup.
///
/// `branches` is present only for headquarters. A branch view has no
/// `branches` key at all, not an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCodeView {
    #[serde(flatten)]
    pub record: SwiftCode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<BranchView>>,
}

impl SwiftCodeView {
    pub fn is_headquarters(&self) -> bool {
        self.branches.is_some()
    }
}

/// Shape the response for `record`.
///
/// For a headquarters, `branch_lookup` is called once with the institution
/// prefix and its results are embedded in the order returned. For a branch
/// the lookup is never called.
pub fn resolve_view<F, E>(record: SwiftCode, branch_lookup: F) -> Result<SwiftCodeView, E>
where
    F: FnOnce(&str) -> Result<Vec<SwiftCode>, E>,
{
    if !record.is_headquarter {
        return Ok(SwiftCodeView {
            record,
            branches: None,
        });
    }

    let branches = match record.prefix() {
        Some(prefix) => branch_lookup(prefix)?
            .into_iter()
            .filter(|b| record.has_branch(b))
            .map(BranchView::from)
            .collect(),
        None => Vec::new(),
    };

    Ok(SwiftCodeView {
        record,
        branches: Some(branches),
    })
}

/// Response shape for a country listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryListing {
    pub country_iso2: String,
    pub country_name: String,
    pub swift_codes: Vec<SwiftCode>,
}

// ============================================================================
// TESTS
// ============================================================================
