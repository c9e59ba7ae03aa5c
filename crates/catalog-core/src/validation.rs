//! Input validation for catalog identifiers
//!
//! Namespaces and names arrive from integrations (database URIs, Spark
//! application names, dotted table names) and may contain any printable
//! character. Validation only rejects values that cannot round-trip through a
//! node id:
//! - Empty values
//! - Excessively long values
//! - Control characters
//! - Colons in names (the name of a node id is the text after its last colon)

use crate::{CatalogError, Result};

/// Maximum length for namespaces
pub const MAX_NAMESPACE_LEN: usize = 1024;

/// Maximum length for job, dataset and field names
pub const MAX_NAME_LEN: usize = 1024;

/// Validate a namespace
///
/// Requirements:
/// - Not empty
/// - <= 1024 characters
/// - No control characters
pub fn validate_namespace(namespace: &str) -> Result<()> {
    validate_component(namespace, "Namespace", MAX_NAMESPACE_LEN)
}

/// Validate a job, dataset or field name
///
/// Requirements:
/// - Not empty
/// - <= 1024 characters
/// - No control characters
/// - No `:`
pub fn validate_name(name: &str) -> Result<()> {
    validate_component(name, "Name", MAX_NAME_LEN)?;

    if name.contains(':') {
        return Err(CatalogError::ValidationError(format!(
            "Name '{}' cannot contain ':'",
            name
        )));
    }

    Ok(())
}

fn validate_component(value: &str, label: &str, max_len: usize) -> Result<()> {
    if value.is_empty() {
        return Err(CatalogError::ValidationError(format!(
            "{} cannot be empty",
            label
        )));
    }

    let len = value.chars().count();
    if len > max_len {
        return Err(CatalogError::ValidationError(format!(
            "{} too long: {} > {} characters",
            label, len, max_len
        )));
    }

    if value.chars().any(char::is_control) {
        return Err(CatalogError::ValidationError(format!(
            "{} contains control characters",
            label
        )));
    }

    Ok(())
}
