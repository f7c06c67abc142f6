//! Employee and role records.
//!
//! Both resources share one shape: a server-generated id, a unique `name`
//! natural key and caller-supplied timestamps. [`RecordKind`] selects which
//! resource a service or repository works on.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{FieldViolation, Validate, ValidationErrors};

/// Minimum length of a record name, in characters.
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum length of a record name, in characters.
pub const NAME_MAX_CHARS: usize = 155;

/// Resource type a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Employee,
    Role,
}

impl RecordKind {
    /// Backing table name.
    pub fn table(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Role => "role",
        }
    }

    /// Lower-case label used in messages and logs.
    pub fn label(self) -> &'static str {
        // Table names double as labels.
        self.table()
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Employee => "employees",
            Self::Role => "roles",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Server-generated record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure to parse a [`RecordId`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id format: {0}")]
pub struct RecordIdParseError(String);

impl FromStr for RecordId {
    type Err = RecordIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|_| RecordIdParseError(trimmed.to_owned()))
    }
}

/// Validated record name.
///
/// # Examples
/// ```
/// use idm::domain::RecordName;
///
/// assert!(RecordName::parse("Pupkin").is_ok());
/// assert!(RecordName::parse("P").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordName(String);

impl RecordName {
    /// Check the length bounds and wrap the name.
    pub fn parse(value: impl Into<String>) -> Result<Self, FieldViolation> {
        let value = value.into();
        let chars = value.chars().count();
        if chars < NAME_MIN_CHARS {
            return Err(FieldViolation::new(
                "name",
                "min",
                format!("name must be at least {NAME_MIN_CHARS} characters"),
            ));
        }
        if chars > NAME_MAX_CHARS {
            return Err(FieldViolation::new(
                "name",
                "max",
                format!("name must be at most {NAME_MAX_CHARS} characters"),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RecordName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted employee or role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated insert payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub name: RecordName,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload as received from a client; every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRecordRequest {
    pub name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CreateRecordRequest {
    /// Fully populated request.
    pub fn new(
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        }
    }
}

fn required(field: &str) -> FieldViolation {
    FieldViolation::new(field, "required", format!("{field} is required"))
}

impl Validate for CreateRecordRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        match self.name.as_deref() {
            None | Some("") => errors.push(required("name")),
            Some(name) => {
                if let Err(violation) = RecordName::parse(name) {
                    errors.push(violation);
                }
            }
        }
        if self.created_at.is_none() {
            errors.push(required("createdAt"));
        }
        if self.updated_at.is_none() {
            errors.push(required("updatedAt"));
        }
        errors.into_result()
    }
}

impl TryFrom<CreateRecordRequest> for NewRecord {
    type Error = ValidationErrors;

    fn try_from(request: CreateRecordRequest) -> Result<Self, Self::Error> {
        request.validate()?;
        match request {
            CreateRecordRequest {
                name: Some(name),
                created_at: Some(created_at),
                updated_at: Some(updated_at),
            } => Ok(Self {
                name: RecordName::parse(name).map_err(|v| ValidationErrors::from(vec![v]))?,
                created_at,
                updated_at,
            }),
            _ => Err(ValidationErrors::from(vec![required("request")])),
        }
    }
}
