// Registry of named custom validators

use crate::{Result, ValidationError};
use gauntlet_log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static CAMEL_CASE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][a-z0-9]*(?:[A-Z][a-z0-9]*)*$").unwrap());

/// Predicate over a field value, `None` when the field is missing.
pub type PredicateFn = Arc<dyn Fn(Option<&str>) -> bool + Send + Sync>;

/// Whether `name` is camelCase or PascalCase.
pub fn is_camel_case(name: &str) -> bool {
    CAMEL_CASE_REGEX.is_match(name)
}

/// `IsEven` / `isEven` -> `isEven`
pub fn method_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `isEven` -> `is even`, `HTTPCode` -> `http code`
///
/// A run of capitals stays one word; its last capital starts the next word
/// when a lower-case letter follows it.
pub fn describe(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        let starts_word = i == 0
            || (c.is_uppercase()
                && (!chars[i - 1].is_uppercase()
                    || chars.get(i + 1).is_some_and(|next| next.is_lowercase())));
        if starts_word {
            words.push(String::new());
        }
        if let Some(word) = words.last_mut() {
            word.extend(c.to_lowercase());
        }
    }
    words.join(" ")
}

/// A validator registered under a name.
#[derive(Clone)]
pub struct RegisteredValidator {
    name: String,
    expected: String,
    predicate: PredicateFn,
}

impl RegisteredValidator {
    /// Builder method name, e.g. `isEven`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default expectation text, e.g. `is even`
    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn predicate(&self) -> PredicateFn {
        self.predicate.clone()
    }

    pub fn check(&self, value: Option<&str>) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for RegisteredValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredValidator")
            .field("name", &self.name)
            .field("expected", &self.expected)
            .finish()
    }
}

/// Named validators made available to every builder created from the same
/// [`RequestValidator`](crate::RequestValidator).
///
/// Populate it while configuring the application, then share it; builders
/// only read from it.
///
/// ```
/// use gauntlet_validation::ValidatorRegistry;
///
/// let mut registry = ValidatorRegistry::new();
/// registry
///     .register("isEven", |value| {
///         value.and_then(|v| v.parse::<i64>().ok()).is_some_and(|n| n % 2 == 0)
///     })
///     .unwrap();
///
/// let even = registry.get("isEven").unwrap();
/// assert_eq!(even.expected(), "is even");
/// assert!(even.check(Some("4")));
/// assert!(registry.register("is_even", |_| true).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, RegisteredValidator>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `predicate` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, predicate: F) -> Result<&RegisteredValidator>
    where
        F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
    {
        if !is_camel_case(name) {
            return Err(ValidationError::InvalidName(name.to_string()));
        }

        let entry = RegisteredValidator {
            name: method_name(name),
            expected: describe(name),
            predicate: Arc::new(predicate),
        };
        debug!("registered validator {} ({})", entry.name, entry.expected);

        let key = entry.name.clone();
        self.validators.insert(key.clone(), entry);
        Ok(&self.validators[&key])
    }

    /// Look up by name, in either camel or Pascal spelling.
    pub fn get(&self, name: &str) -> Option<&RegisteredValidator> {
        self.validators.get(&method_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_detection() {
        for ok in ["isEven", "IsEven", "even", "isHttp2Ok", "HTTPCode"] {
            assert!(is_camel_case(ok), "{ok}");
        }
        for bad in ["", "is_even", "is even", "is-even", "2fast", "isEven!"] {
            assert!(!is_camel_case(bad), "{bad}");
        }
    }

    #[test]
    fn test_method_name() {
        assert_eq!(method_name("IsEven"), "isEven");
        assert_eq!(method_name("isEven"), "isEven");
        assert_eq!(method_name(""), "");
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe("isEven"), "is even");
        assert_eq!(describe("IsEven"), "is even");
        assert_eq!(describe("isValidPostCode"), "is valid post code");
        assert_eq!(describe("positive"), "positive");
    }

    #[test]
    fn test_describe_keeps_acronyms_together() {
        assert_eq!(describe("HTTPCode"), "http code");
        assert_eq!(describe("isURL"), "is url");
        assert_eq!(describe("isHTTPStatus"), "is http status");
        assert_eq!(describe("isHttp2Ok"), "is http2 ok");
    }

    #[test]
    fn test_register_acronym_name() {
        let mut registry = ValidatorRegistry::new();
        let entry = registry.register("IsUUID", |v| v.is_some()).unwrap();

        assert_eq!(entry.name(), "isUUID");
        assert_eq!(entry.expected(), "is uuid");
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ValidatorRegistry::new();
        let entry = registry.register("IsPositive", |v| {
            v.and_then(|v| v.parse::<i64>().ok()).is_some_and(|n| n > 0)
        });
        assert_eq!(entry.unwrap().name(), "isPositive");

        assert!(registry.contains("isPositive"));
        assert!(registry.contains("IsPositive"));
        let entry = registry.get("isPositive").unwrap();
        assert_eq!(entry.expected(), "is positive");
        assert!(entry.check(Some("3")));
        assert!(!entry.check(Some("-3")));
        assert!(!entry.check(None));
    }

    #[test]
    fn test_register_rejects_bad_names() {
        let mut registry = ValidatorRegistry::new();
        let err = registry.register("is_positive", |_| true).unwrap_err();

        assert!(matches!(err, ValidationError::InvalidName(name) if name == "is_positive"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = ValidatorRegistry::new();
        registry.register("isOk", |_| false).unwrap();
        registry.register("IsOk", |_| true).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.get("isOk").unwrap().check(None));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["isOk"]);
    }
}
