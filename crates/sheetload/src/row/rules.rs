//! Field-level validation rules.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A single check applied to one field value.
///
/// Every check except [`Check::Required`] passes on a blank value, so
/// presence is only ever reported once.
#[derive(Clone)]
pub enum Check {
    /// Value must be present and not blank.
    Required,
    /// Value must look like an email address.
    Email,
    /// Value must parse as a signed integer.
    Integer,
    /// Value must match a regex.
    Pattern(Regex),
    /// Character count bounds (inclusive).
    Length { min: Option<usize>, max: Option<usize> },
    /// Value must be one of a fixed set.
    OneOf(Vec<String>),
    /// Arbitrary predicate with the message reported when it fails.
    Custom { message: String, predicate: Predicate },
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Required => write!(f, "Required"),
            Check::Email => write!(f, "Email"),
            Check::Integer => write!(f, "Integer"),
            Check::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Check::Length { min, max } => write!(f, "Length({:?}..={:?})", min, max),
            Check::OneOf(values) => write!(f, "OneOf({:?})", values),
            Check::Custom { message, .. } => write!(f, "Custom({})", message),
        }
    }
}

/// A check bound to a field name.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: String,
    pub check: Check,
}

impl FieldRule {
    pub fn new(field: impl Into<String>, check: Check) -> Self {
        Self {
            field: field.into(),
            check,
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, Check::Required)
    }

    pub fn email(field: impl Into<String>) -> Self {
        Self::new(field, Check::Email)
    }

    pub fn integer(field: impl Into<String>) -> Self {
        Self::new(field, Check::Integer)
    }

    /// Compile a pattern rule.
    pub fn pattern(field: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self::new(field, Check::Pattern(Regex::new(pattern)?)))
    }

    pub fn length(field: impl Into<String>, min: Option<usize>, max: Option<usize>) -> Self {
        Self::new(field, Check::Length { min, max })
    }

    pub fn one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            field,
            Check::OneOf(values.into_iter().map(Into::into).collect()),
        )
    }

    /// A rule backed by an arbitrary predicate.
    ///
    /// ```
    /// use sheetload::FieldRule;
    ///
    /// let rule = FieldRule::custom("code", "must start with S", |v| v.starts_with('S'));
    /// assert_eq!(rule.apply(Some("X1")).as_deref(), Some("must start with S"));
    /// assert_eq!(rule.apply(Some("S1")), None);
    /// ```
    pub fn custom<F>(field: impl Into<String>, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::new(
            field,
            Check::Custom {
                message: message.into(),
                predicate: Arc::new(predicate),
            },
        )
    }

    /// Apply the rule to a value, returning the violation message if any.
    pub fn apply(&self, value: Option<&str>) -> Option<String> {
        let value = match value.map(str::trim) {
            Some(v) if !v.is_empty() => v,
            _ => {
                return match self.check {
                    Check::Required => Some("is required".to_string()),
                    _ => None,
                };
            }
        };

        match &self.check {
            Check::Required => None,
            Check::Email => (!EMAIL_PATTERN.is_match(value)).then(|| "is not an email".to_string()),
            Check::Integer => value
                .parse::<i64>()
                .is_err()
                .then(|| "is not an integer".to_string()),
            Check::Pattern(re) => (!re.is_match(value)).then(|| "is invalid".to_string()),
            Check::Length { min, max } => {
                let count = value.chars().count();
                if let Some(min) = min.filter(|&min| count < min) {
                    Some(format!("is too short (minimum is {} characters)", min))
                } else {
                    max.filter(|&max| count > max)
                        .map(|max| format!("is too long (maximum is {} characters)", max))
                }
            }
            Check::OneOf(values) => (!values.iter().any(|v| v == value))
                .then(|| "is not included in the list".to_string()),
            Check::Custom { message, predicate } => {
                (!predicate(value)).then(|| message.clone())
            }
        }
    }
}
