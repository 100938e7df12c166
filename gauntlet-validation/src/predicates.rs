// String-format predicates used by the built-in builder checks

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?(?:0|[1-9][0-9]*)$").unwrap());

static INT_LEADING_ZEROES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?[0-9]+$").unwrap());

static FLOAT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+)?(?:\.[0-9]*)?(?:[eE][-+]?[0-9]+)?$").unwrap()
});

/// Options for [`Predicates::is_int`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntOptions {
    /// Smallest accepted value, inclusive
    pub min: Option<i64>,
    /// Largest accepted value, inclusive
    pub max: Option<i64>,
    /// Accept `007` style values (on by default)
    pub allow_leading_zeroes: bool,
}

impl Default for IntOptions {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            allow_leading_zeroes: true,
        }
    }
}

impl IntOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Reject `007` style values.
    pub fn disallow_leading_zeroes(mut self) -> Self {
        self.allow_leading_zeroes = false;
        self
    }
}

/// The string predicates backing the builder's built-in checks.
///
/// Every predicate answers `false` for a missing value.
pub trait Predicates: Send + Sync {
    fn is_int(&self, value: Option<&str>, options: &IntOptions) -> bool;

    fn is_float(&self, value: Option<&str>) -> bool;

    fn is_boolean(&self, value: Option<&str>) -> bool;

    fn contains(&self, value: Option<&str>, needle: &str) -> bool;
}

/// Default predicate set.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPredicates {
    /// Also accept `yes`/`no` (any case) as booleans
    pub loose_booleans: bool,
}

impl StandardPredicates {
    pub fn loose() -> Self {
        Self {
            loose_booleans: true,
        }
    }
}

impl Predicates for StandardPredicates {
    fn is_int(&self, value: Option<&str>, options: &IntOptions) -> bool {
        let Some(value) = value else {
            return false;
        };

        let shape = if options.allow_leading_zeroes {
            &*INT_LEADING_ZEROES_REGEX
        } else {
            &*INT_REGEX
        };
        if !shape.is_match(value) {
            return false;
        }

        if options.min.is_none() && options.max.is_none() {
            return true;
        }
        // Out of i64 range can't satisfy an i64 bound
        let Ok(number) = value.parse::<i64>() else {
            return false;
        };
        options.min.is_none_or(|min| number >= min) && options.max.is_none_or(|max| number <= max)
    }

    fn is_float(&self, value: Option<&str>) -> bool {
        match value {
            None | Some("") | Some(".") | Some("+") | Some("-") => false,
            Some(value) => {
                // the mantissa needs at least one digit: rejects `e5` and `+.`
                let mantissa = value.split(['e', 'E']).next().unwrap_or_default();
                FLOAT_REGEX.is_match(value) && mantissa.chars().any(|c| c.is_ascii_digit())
            }
        }
    }

    fn is_boolean(&self, value: Option<&str>) -> bool {
        match value {
            Some("true" | "false" | "1" | "0") => true,
            Some(other) if self.loose_booleans => {
                ["yes", "no", "true", "false"]
                    .iter()
                    .any(|word| other.eq_ignore_ascii_case(word))
            }
            _ => false,
        }
    }

    fn contains(&self, value: Option<&str>, needle: &str) -> bool {
        value.is_some_and(|value| value.contains(needle))
    }
}
