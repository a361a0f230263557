use crate::error::FieldError;
use crate::model::{Author, Example, Export, Keywords, PackageRecord, Repository};
use crate::normalize::FieldMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// How field failures propagate out of validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Every failure is recorded and the field falls back to absent.
    #[default]
    Lenient,
    /// The first failing mandatory field, or an invalid version, is raised.
    Strict,
}

/// A record together with the field errors collected while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    record: PackageRecord,
    errors: Vec<FieldError>,
}

impl Validated {
    pub fn record(&self) -> &PackageRecord {
        &self.record
    }

    /// Field errors that did not abort validation.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_record(self) -> PackageRecord {
        self.record
    }

    pub fn into_parts(self) -> (PackageRecord, Vec<FieldError>) {
        (self.record, self.errors)
    }
}

type ApplyFn = fn(&Value, &mut PackageRecord) -> Result<(), FieldError>;

struct FieldValidator {
    field: &'static str,
    mandatory: bool,
    apply: ApplyFn,
}

const fn mandatory(field: &'static str, apply: ApplyFn) -> FieldValidator {
    FieldValidator {
        field,
        mandatory: true,
        apply,
    }
}

const fn optional(field: &'static str, apply: ApplyFn) -> FieldValidator {
    FieldValidator {
        field,
        mandatory: false,
        apply,
    }
}

/// Mandatory fields come first so strict mode reports them in this order.
const FIELD_VALIDATORS: &[FieldValidator] = &[
    mandatory("name", |v, r| {
        r.name = Some(text("name", v)?);
        Ok(())
    }),
    mandatory("version", |v, r| {
        r.version = Some(semver_text(v)?);
        Ok(())
    }),
    mandatory("description", |v, r| {
        r.description = Some(text("description", v)?);
        Ok(())
    }),
    mandatory("keywords", |v, r| {
        let keywords: Keywords = string_list("keywords", v)?.into_iter().collect();
        if keywords.is_empty() {
            return Err(FieldError::Missing { field: "keywords" });
        }
        r.keywords = Some(keywords);
        Ok(())
    }),
    mandatory("authors", |v, r| {
        let authors: Vec<Author> = structured("authors", v)?;
        if authors.is_empty() {
            return Err(FieldError::Missing { field: "authors" });
        }
        if authors.iter().any(|a| a.name.trim().is_empty()) {
            return Err(FieldError::invalid("authors", "author name must not be empty"));
        }
        r.authors = Some(authors);
        Ok(())
    }),
    optional("title", |v, r| {
        r.title = Some(text("title", v)?);
        Ok(())
    }),
    optional("homepage", |v, r| {
        r.homepage = Some(text("homepage", v)?);
        Ok(())
    }),
    optional("repository", |v, r| {
        let repo: Repository = structured("repository", v)?;
        if repo.url.trim().is_empty() {
            return Err(FieldError::invalid("repository", "url must not be empty"));
        }
        r.repository = Some(repo);
        Ok(())
    }),
    optional("license", |v, r| {
        r.license = Some(text("license", v)?);
        Ok(())
    }),
    optional("platforms", |v, r| {
        r.platforms = Some(string_list("platforms", v)?);
        Ok(())
    }),
    optional("frameworks", |v, r| {
        r.frameworks = Some(string_list("frameworks", v)?);
        Ok(())
    }),
    optional("export", |v, r| {
        r.export = Some(structured::<Export>("export", v)?);
        Ok(())
    }),
    optional("examples", |v, r| {
        r.examples = Some(structured::<BTreeMap<String, Example>>("examples", v)?);
        Ok(())
    }),
    optional("system", |v, r| {
        r.system = Some(string_list("system", v)?);
        Ok(())
    }),
    optional("engines", |v, r| {
        r.engines = Some(structured::<BTreeMap<String, String>>("engines", v)?);
        Ok(())
    }),
    optional("packages", |v, r| {
        let Value::Object(packages) = v else {
            return Err(FieldError::invalid("packages", "expected an object"));
        };
        r.packages = Some(packages.clone());
        Ok(())
    }),
];

fn text(field: &'static str, value: &Value) -> Result<String, FieldError> {
    let Value::String(s) = value else {
        return Err(FieldError::invalid(field, format!("expected a string, got {value}")));
    };
    let s = s.trim();
    if s.is_empty() {
        return Err(FieldError::Missing { field });
    }
    Ok(s.to_owned())
}

fn semver_text(value: &Value) -> Result<String, FieldError> {
    let raw = match value {
        Value::String(s) => s.trim().to_owned(),
        other => other.to_string(),
    };
    if raw.is_empty() {
        return Err(FieldError::Missing { field: "version" });
    }
    semver::Version::parse(&raw).map_err(|_| FieldError::InvalidSemVer { value: raw.clone() })?;
    Ok(raw)
}

fn string_list(field: &'static str, value: &Value) -> Result<Vec<String>, FieldError> {
    let Value::Array(items) = value else {
        return Err(FieldError::invalid(field, "expected a sequence of strings"));
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(|s| s.trim().to_owned())
                .ok_or_else(|| FieldError::invalid(field, format!("non-string entry {item}")))
        })
        .collect()
}

fn structured<T: DeserializeOwned>(field: &'static str, value: &Value) -> Result<T, FieldError> {
    T::deserialize(value).map_err(|e| FieldError::invalid(field, e.to_string()))
}

impl PackageRecord {
    /// Build a record, collecting every field failure instead of raising.
    pub fn lenient(fields: &FieldMap) -> Validated {
        let mut errors = Vec::new();
        let record = run_validators(fields, |_, err| {
            errors.push(err);
            Ok(())
        })
        .unwrap_or_default();
        Validated { record, errors }
    }

    /// Build a record, failing on the first missing or invalid mandatory field
    /// or on a malformed version. Failures of optional fields are collected.
    pub fn strict(fields: &FieldMap) -> Result<Validated, FieldError> {
        let mut errors = Vec::new();
        let record = run_validators(fields, |validator, err| {
            if validator.mandatory || matches!(err, FieldError::InvalidSemVer { .. }) {
                return Err(err);
            }
            errors.push(err);
            Ok(())
        })?;
        Ok(Validated { record, errors })
    }

    pub fn validate(fields: &FieldMap, mode: ValidationMode) -> Result<Validated, FieldError> {
        match mode {
            ValidationMode::Lenient => Ok(Self::lenient(fields)),
            ValidationMode::Strict => Self::strict(fields),
        }
    }
}

fn run_validators(
    fields: &FieldMap,
    mut on_error: impl FnMut(&FieldValidator, FieldError) -> Result<(), FieldError>,
) -> Result<PackageRecord, FieldError> {
    let mut record = PackageRecord::default();
    for validator in FIELD_VALIDATORS {
        let outcome = match fields.get(validator.field).filter(|v| !v.is_null()) {
            Some(value) => (validator.apply)(value, &mut record),
            None if validator.mandatory => Err(FieldError::Missing {
                field: validator.field,
            }),
            None => continue,
        };
        if let Err(err) = outcome {
            debug!("field `{}` rejected: {err}", validator.field);
            on_error(validator, err)?;
        }
    }

    let duplicate_homepage = match (&record.homepage, &record.repository) {
        (Some(homepage), Some(repo)) => *homepage == repo.url,
        _ => false,
    };
    if duplicate_homepage {
        debug!("dropping homepage that duplicates the repository url");
        record.homepage = None;
    }
    Ok(record)
}
