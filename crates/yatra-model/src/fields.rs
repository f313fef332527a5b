use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const FULL_NAME_MAX_LEN: usize = 120;
pub const PHONE_MAX_LEN: usize = 20;
pub const PHONE_MIN_DIGITS: usize = 7;
pub const EMAIL_MAX_LEN: usize = 254;
pub const ADDRESS_MAX_LEN: usize = 500;
pub const FREE_TEXT_MAX_LEN: usize = 1000;
pub const MOTIVATION_MAX_LEN: usize = 2000;

/// First violated rule for a submitted draft. The `Display` form is the
/// user-facing rejection message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldError {
    Missing(&'static str),
    TooLong(&'static str, usize),
    OutOfRange(&'static str, i64, i64),
    Invalid(&'static str, &'static str),
    ConsentRequired,
}

impl FieldError {
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing(name)
            | Self::TooLong(name, _)
            | Self::OutOfRange(name, _, _)
            | Self::Invalid(name, _) => name,
            Self::ConsentRequired => "agreed_to_terms",
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "{name} is required"),
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::OutOfRange(name, min, max) => {
                write!(f, "{name} must be between {min} and {max}")
            }
            Self::Invalid(name, msg) => write!(f, "{name} {msg}"),
            Self::ConsentRequired => {
                f.write_str("terms and conditions must be accepted before registering")
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// System-generated identifier assigned to every persisted registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(input: &str) -> Result<Self, FieldError> {
        Uuid::parse_str(input.trim())
            .map(Self)
            .map_err(|_| FieldError::Invalid("id", "must be a uuid"))
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Display for RegistrationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct FullName(String);

impl FullName {
    pub fn parse(input: &str) -> Result<Self, FieldError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(FieldError::Missing("full_name"));
        }
        if s.len() > FULL_NAME_MAX_LEN {
            return Err(FieldError::TooLong("full_name", FULL_NAME_MAX_LEN));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for FullName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phone-shaped contact field. Also used for the emergency contact via
/// [`Phone::parse_field`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Phone(String);

impl Phone {
    pub fn parse(input: &str) -> Result<Self, FieldError> {
        Self::parse_field(input, "phone")
    }

    pub fn parse_field(input: &str, field: &'static str) -> Result<Self, FieldError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(FieldError::Missing(field));
        }
        if s.len() > PHONE_MAX_LEN {
            return Err(FieldError::TooLong(field, PHONE_MAX_LEN));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
        {
            return Err(FieldError::Invalid(
                field,
                "may only contain digits, spaces, and + - ( )",
            ));
        }
        if s.chars().filter(char::is_ascii_digit).count() < PHONE_MIN_DIGITS {
            return Err(FieldError::Invalid(field, "must contain at least 7 digits"));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Phone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Email(String);

impl Email {
    pub fn parse(input: &str) -> Result<Self, FieldError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(FieldError::Missing("email"));
        }
        if s.len() > EMAIL_MAX_LEN {
            return Err(FieldError::TooLong("email", EMAIL_MAX_LEN));
        }
        let valid = match s.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !valid || s.contains(char::is_whitespace) {
            return Err(FieldError::Invalid(
                "email",
                "must be an address of the form name@domain",
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive age limits for participant intake. The published form accepts
/// 1..=120; the stricter on-site variant narrows this to 18..=80 through
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBounds {
    pub min: u8,
    pub max: u8,
}

impl Default for AgeBounds {
    fn default() -> Self {
        Self { min: 1, max: 120 }
    }
}

impl AgeBounds {
    pub fn check(&self, value: i64) -> Result<u8, FieldError> {
        if value < i64::from(self.min) || value > i64::from(self.max) {
            return Err(FieldError::OutOfRange(
                "age",
                i64::from(self.min),
                i64::from(self.max),
            ));
        }
        Ok(value as u8)
    }
}

pub(crate) fn required_text(
    input: &str,
    field: &'static str,
    max_len: usize,
) -> Result<String, FieldError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(FieldError::Missing(field));
    }
    if s.len() > max_len {
        return Err(FieldError::TooLong(field, max_len));
    }
    Ok(s.to_string())
}

pub(crate) fn optional_text(
    input: &str,
    field: &'static str,
    max_len: usize,
) -> Result<Option<String>, FieldError> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if s.len() > max_len {
        return Err(FieldError::TooLong(field, max_len));
    }
    Ok(Some(s.to_string()))
}
