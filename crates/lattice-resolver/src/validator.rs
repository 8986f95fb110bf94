//! Package identity and cross-package validation

use crate::error::ValidationError;
use crate::package::Package;

/// Maximum length of a package id
pub const MAX_PACKAGE_ID_LEN: usize = 100;

/// Package validator
pub struct Validator;

impl Validator {
    /// Validate package id format
    ///
    /// Ids are checked after trimming surrounding whitespace.
    pub fn validate_package_id(id: &str) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidPackageId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let name = id.trim();

        if name.is_empty() {
            return Err(invalid("package id cannot be empty"));
        }

        if name.len() > MAX_PACKAGE_ID_LEN {
            return Err(invalid(&format!(
                "exceeds maximum length of {} characters",
                MAX_PACKAGE_ID_LEN
            )));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(invalid(
                "contains invalid characters (only lowercase, digits, - allowed)",
            ));
        }

        if name.starts_with('-') || name.ends_with('-') {
            return Err(invalid("cannot start or end with -"));
        }

        if name.contains("--") {
            return Err(invalid("cannot contain consecutive -"));
        }

        Ok(())
    }

    /// Check that two packages agree on every platform version both declare
    ///
    /// A dimension declared by only one package (or neither) is not checked.
    pub fn validate_dependency_compatibility(
        first: &Package,
        second: &Package,
    ) -> Result<(), ValidationError> {
        let theirs = &second.manifest.platform_requirements;

        for (dimension, first_version) in &first.manifest.platform_requirements {
            let Some(second_version) = theirs.get(dimension) else {
                continue;
            };

            if !first_version.is_compatible_with(second_version) {
                return Err(ValidationError::IncompatiblePlatform {
                    dimension: dimension.clone(),
                    first: first.id.to_string(),
                    first_version: first_version.to_string(),
                    second: second.id.to_string(),
                    second_version: second_version.to_string(),
                });
            }
        }

        Ok(())
    }
}
