//! Client-side form validation
//!
//! Required-field and format checks run before any network call. Failures are
//! collected per field so a form can show them inline next to each input.

use std::collections::BTreeMap;
use std::fmt;

/// One check applied to a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    MinLength(usize),
    MaxLength(usize),
    /// Absolute http(s) URL
    Url,
}

impl Rule {
    fn check(&self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        match self {
            Rule::Required if trimmed.is_empty() => Some("is required".to_string()),
            Rule::Email if !is_email(trimmed) => Some("must be a valid email address".to_string()),
            Rule::MinLength(min) if trimmed.chars().count() < *min => {
                Some(format!("must be at least {min} characters"))
            }
            Rule::MaxLength(max) if trimmed.chars().count() > *max => {
                Some(format!("must be at most {max} characters"))
            }
            Rule::Url if !is_url(trimmed) => Some("must be a valid http(s) URL".to_string()),
            _ => None,
        }
    }
}

/// Field name → messages, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    /// Messages for one field; empty when the field passed
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{field} {}", messages.join(", ")))
            .collect();
        write!(f, "validation failed: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects rule failures for a whole form
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `rules` in order; only the first failure per call is recorded
    pub fn check(&mut self, field: &str, value: &str, rules: &[Rule]) -> &mut Self {
        if let Some(message) = rules.iter().find_map(|rule| rule.check(value)) {
            self.errors.add(field, message);
        }
        self
    }

    /// Like [`Validator::check`] but skips empty values
    pub fn check_optional(&mut self, field: &str, value: Option<&str>, rules: &[Rule]) -> &mut Self {
        match value {
            Some(v) if !v.trim().is_empty() => self.check(field, v, rules),
            _ => self,
        }
    }

    /// Confirmation fields such as "repeat password"
    pub fn check_matches(&mut self, field: &str, value: &str, other: &str, other_label: &str) -> &mut Self {
        if value != other {
            self.errors.add(field, format!("must match {other_label}"));
        }
        self
    }

    /// Record a failure found by a check that has no [`Rule`]
    pub fn fail(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.add(field, message);
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Pre-submit checks for a form or record
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn is_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
