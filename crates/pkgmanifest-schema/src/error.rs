use crate::kind::ManifestKind;
use thiserror::Error;

/// Errors that abort parsing or strict validation of a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("unknown manifest kind: '{0}'")]
    UnknownManifestKind(String),
    #[error("malformed {kind} document: {reason}")]
    MalformedDocument { kind: ManifestKind, reason: String },
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
    #[error("manifest validation failed: {0}")]
    Field(#[from] FieldError),
}

impl ManifestError {
    pub(crate) fn malformed(kind: ManifestKind, reason: impl ToString) -> Self {
        Self::MalformedDocument {
            kind,
            reason: reason.to_string(),
        }
    }
}

/// A single field failing its validator.
///
/// Lenient validation collects these; strict validation raises the first one
/// that concerns a mandatory field (or the version).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("missing value for `{field}` field")]
    Missing { field: &'static str },
    #[error("invalid value for `{field}` field: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("invalid semantic versioning format for `version` field: '{value}'")]
    InvalidSemVer { value: String },
}

impl FieldError {
    /// Name of the canonical field this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field } | Self::Invalid { field, .. } => field,
            Self::InvalidSemVer { .. } => "version",
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_names_its_field() {
        assert_eq!(FieldError::Missing { field: "authors" }.field(), "authors");
        assert_eq!(
            FieldError::InvalidSemVer {
                value: "x".to_owned()
            }
            .field(),
            "version"
        );
    }

    #[test]
    fn messages_identify_field_and_value() {
        let err = FieldError::InvalidSemVer {
            value: "broken_version".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("`version`"));
        assert!(msg.contains("broken_version"));

        let err = ManifestError::from(FieldError::Missing { field: "description" });
        assert!(err.to_string().contains("`description`"));
    }
}
