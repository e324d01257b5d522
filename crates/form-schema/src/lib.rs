//! Declarative Form Validation
//!
//! Field rule lists with caller-supplied messages. Validation returns a
//! field-to-message map; the first failing rule of each field wins. Length
//! and format rules pass on blank input, so pair them with `required` when
//! blanks should be rejected.

use std::collections::{BTreeMap, HashMap};

/// A single validation rule
#[derive(Clone, Debug, PartialEq, Eq)]
enum Rule {
    Required,
    MinLen(usize),
    MaxLen(usize),
    Email,
}

impl Rule {
    /// Whether `value` satisfies this rule. Blank input only fails
    /// `Required`.
    fn passes(&self, value: &str) -> bool {
        let blank = value.trim().is_empty();
        match self {
            Rule::Required => !blank,
            Rule::MinLen(n) => blank || value.chars().count() >= *n,
            Rule::MaxLen(n) => blank || value.chars().count() <= *n,
            Rule::Email => blank || looks_like_email(value),
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Rules for one named field, checked in declaration order
#[derive(Clone, Debug)]
pub struct Field {
    name: String,
    checks: Vec<(Rule, String)>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
        }
    }

    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.checks.push((Rule::Required, message.into()));
        self
    }

    pub fn min(mut self, len: usize, message: impl Into<String>) -> Self {
        self.checks.push((Rule::MinLen(len), message.into()));
        self
    }

    pub fn max(mut self, len: usize, message: impl Into<String>) -> Self {
        self.checks.push((Rule::MaxLen(len), message.into()));
        self
    }

    pub fn email(mut self, message: impl Into<String>) -> Self {
        self.checks.push((Rule::Email, message.into()));
        self
    }
}

/// A set of field rules validated together
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate `values` (field name to current input; a missing entry
    /// counts as blank). Returns the collected per-field messages.
    pub fn validate(&self, values: &HashMap<String, String>) -> Errors {
        let mut by_field = BTreeMap::new();
        for field in &self.fields {
            let value = values.get(&field.name).map(String::as_str).unwrap_or("");
            for (rule, message) in &field.checks {
                if !rule.passes(value) {
                    by_field.insert(field.name.clone(), message.clone());
                    break;
                }
            }
        }
        Errors { by_field }
    }
}

/// Validation outcome: one message per failing field
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Errors {
    by_field: BTreeMap<String, String>,
}

impl Errors {
    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.by_field.get(field).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn user_schema() -> Schema {
        Schema::new()
            .field(
                Field::new("name")
                    .required("Name is required")
                    .min(2, "Name is too short")
                    .max(50, "Name is too long"),
            )
            .field(
                Field::new("password")
                    .min(5, "Password is too short")
                    .max(50, "Password is too long"),
            )
            .field(
                Field::new("email")
                    .required("Email is required")
                    .email("Invalid email"),
            )
    }

    #[test]
    fn test_valid_input_has_no_errors() {
        let errors = user_schema().validate(&values(&[
            ("name", "Ana"),
            ("password", "secret"),
            ("email", "ana@example.com"),
        ]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_required_rejects_blank_and_missing() {
        let errors = user_schema().validate(&values(&[("email", "   ")]));
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let errors = user_schema().validate(&values(&[("name", "")]));
        assert_eq!(errors.get("name"), Some("Name is required"));
    }

    #[test]
    fn test_min_len_counts_characters() {
        let errors = user_schema().validate(&values(&[
            ("name", "A"),
            ("email", "a@b.co"),
        ]));
        assert_eq!(errors.get("name"), Some("Name is too short"));
    }

    #[test]
    fn test_max_len_rejects_long_input() {
        let long = "x".repeat(51);
        let errors = user_schema().validate(&values(&[
            ("name", long.as_str()),
            ("email", "a@b.co"),
        ]));
        assert_eq!(errors.get("name"), Some("Name is too long"));
    }

    #[test]
    fn test_optional_length_rule_passes_on_blank() {
        let errors = user_schema().validate(&values(&[
            ("name", "Ana"),
            ("password", ""),
            ("email", "ana@example.com"),
        ]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_short_password_still_fails_when_present() {
        let errors = user_schema().validate(&values(&[
            ("name", "Ana"),
            ("password", "abc"),
            ("email", "ana@example.com"),
        ]));
        assert_eq!(errors.get("password"), Some("Password is too short"));
    }

    #[test]
    fn test_email_shape() {
        for bad in ["plain", "@host.com", "user@", "user@host", "a@b@c.co"] {
            assert!(!looks_like_email(bad), "{bad} accepted");
        }
        for good in ["user@host.com", "a.b@mail.example.org"] {
            assert!(looks_like_email(good), "{good} rejected");
        }
    }

    #[test]
    fn test_error_count() {
        let errors = user_schema().validate(&values(&[("password", "abc")]));
        assert_eq!(errors.len(), 3);
    }
}
