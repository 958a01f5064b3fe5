//! Resource kinds and the mapping from raw JSON into typed records.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{BookerError, Result};

/// Names the envelope key that holds a resource, singular and plural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    name: Cow<'static, str>,
    plural: Cow<'static, str>,
}

impl ResourceKind {
    /// Creates a kind, deriving the plural form from `name`.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        let plural = Cow::Owned(pluralize(&name));
        Self { name, plural }
    }

    /// Creates a kind with an irregular plural.
    #[must_use]
    pub fn with_plural(
        name: impl Into<Cow<'static, str>>,
        plural: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            plural: plural.into(),
        }
    }

    /// Singular key, e.g. `Treatment`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plural key, e.g. `Treatments`.
    #[must_use]
    pub fn plural(&self) -> &str {
        &self.plural
    }
}

/// English plural of a resource name.
#[must_use]
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();

    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u') | None) {
            return format!("{}ies", stem);
        }
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{}es", word);
    }

    format!("{}s", word)
}

/// A record type the API returns.
pub trait Resource: DeserializeOwned + Serialize + Send {
    /// Singular envelope key for this record.
    const KIND: &'static str;

    /// Envelope names for this record.
    #[must_use]
    fn kind() -> ResourceKind {
        ResourceKind::new(Self::KIND)
    }
}

/// Output of the resource mapper.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped<R> {
    /// A mapping became one record.
    One(R),

    /// A sequence became records, order preserved.
    Many(Vec<R>),

    /// Any other shape, passed through.
    Raw(Value),
}

impl<R> Mapped<R> {
    /// Returns the single record, if that is what was mapped.
    #[must_use]
    pub fn into_one(self) -> Option<R> {
        match self {
            Self::One(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the records, if a sequence was mapped.
    #[must_use]
    pub fn into_many(self) -> Option<Vec<R>> {
        match self {
            Self::Many(records) => Some(records),
            _ => None,
        }
    }

    /// Returns the raw value, if nothing was mapped.
    #[must_use]
    pub fn into_raw(self) -> Option<Value> {
        match self {
            Self::Raw(value) => Some(value),
            _ => None,
        }
    }
}

/// Maps `raw` into records of type `R`.
///
/// # Errors
///
/// Returns [`BookerError::Deserialization`] if a record does not fit `R`.
pub fn map_resources<R: Resource>(raw: Value) -> Result<Mapped<R>> {
    match raw {
        Value::Object(_) => Ok(Mapped::One(map_record(raw)?)),
        Value::Array(items) => items
            .into_iter()
            .map(map_record)
            .collect::<Result<Vec<R>>>()
            .map(Mapped::Many),
        other => Ok(Mapped::Raw(other)),
    }
}

/// Maps one record.
///
/// # Errors
///
/// Returns [`BookerError::Deserialization`] if `raw` does not fit `R`.
pub fn map_record<R: Resource>(raw: Value) -> Result<R> {
    serde_json::from_value(raw)
        .map_err(|e| BookerError::Deserialization(format!("{}: {}", R::KIND, e)))
}
