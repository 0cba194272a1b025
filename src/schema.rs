// 📐 Shape Layer - Validation Rules
// Format rules a code and a country identifier must satisfy before they enter
// the model.
//
// Interactive creation only checks type, length and charset. Empty bank or
// country names pass here; the bulk source drops them during cleaning
// (see parser::clean_row).

use crate::entities::NewSwiftCode;

pub const MAX_PAGE_LIMIT: i64 = 1000;
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

// ============================================================================
// FIELD RULES
// ============================================================================

/// 8 or 11 characters, `[A-Z0-9]` only. No case folding happens here.
pub fn check_swift_code(code: &str) -> Result<(), ValidationError> {
    let len = code.chars().count();
    if len != 8 && len != 11 {
        return Err(ValidationError::new(
            "swift_code",
            "SWIFT code must be 8 or 11 characters long",
        ));
    }

    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "swift_code",
            "SWIFT code must contain only uppercase letters (A-Z) and digits (0-9)",
        ));
    }

    Ok(())
}

/// Exactly 2 characters, `[A-Z]` only. No case folding happens here.
pub fn check_country_iso2(country: &str) -> Result<(), ValidationError> {
    if country.chars().count() != 2 {
        return Err(ValidationError::new(
            "country_iso2",
            "Country ISO2 code must be 2 characters long",
        ));
    }

    if !country.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new(
            "country_iso2",
            "Country ISO2 code must contain only uppercase letters (A-Z)",
        ));
    }

    Ok(())
}

/// `skip >= 0` and `1 <= limit <= 1000`.
pub fn check_page(skip: i64, limit: i64) -> ValidationResult<(usize, usize)> {
    let mut errors = Vec::new();

    if skip < 0 {
        errors.push(ValidationError::new("skip", "must be greater than or equal to 0"));
    }
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        errors.push(ValidationError::new(
            "limit",
            &format!("must be between 1 and {}", MAX_PAGE_LIMIT),
        ));
    }

    if errors.is_empty() {
        Ok((skip as usize, limit as usize))
    } else {
        Err(errors)
    }
}

// ============================================================================
// RECORD NORMALIZATION
// ============================================================================

/// Uppercase the code and country fields, then validate.
///
/// Returns the normalized input. The caller's `is_headquarter` is cleared so
/// nothing downstream can mistake it for the derived value.
pub fn normalize_new_swift_code(input: NewSwiftCode) -> ValidationResult<NewSwiftCode> {
    let normalized = NewSwiftCode {
        swift_code: input.swift_code.to_uppercase(),
        bank_name: input.bank_name,
        address: input.address,
        country_iso2: input.country_iso2.to_uppercase(),
        country_name: input.country_name.to_uppercase(),
        is_headquarter: None,
    };

    let errors: Vec<ValidationError> = [
        check_swift_code(&normalized.swift_code),
        check_country_iso2(&normalized.country_iso2),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(errors)
    }
}

// ============================================================================
// TESTS
// ============================================================================
