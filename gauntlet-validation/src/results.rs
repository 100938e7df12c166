// Request-scoped failure accumulation

use gauntlet_core::{Error, HttpRequest, HttpResponse};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Rendered as `got` when the field is absent from its container.
pub const UNDEFINED: &str = "undefined";

/// One failed validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFailure {
    pub message: String,
    pub location: String,
    pub field: String,
    pub expected: String,
    pub got: String,
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}: {} (expected {}, got {})",
            self.location, self.field, self.message, self.expected, self.got
        )
    }
}

/// Failures recorded for one request, in the order they were appended.
///
/// Lives in the request's extensions; clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct ValidationResults {
    failures: Arc<Mutex<Vec<FieldFailure>>>,
}

impl ValidationResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request's list, created empty if no chain has touched the request yet.
    pub fn ensure(req: &mut HttpRequest) -> Self {
        (*req.extensions.get_or_insert_with(ValidationResults::new)).clone()
    }

    /// The request's list, if one was ever created.
    pub fn of(req: &HttpRequest) -> Option<Self> {
        req.extensions.get::<ValidationResults>().cloned()
    }

    pub fn push(&self, failure: FieldFailure) {
        self.failures.lock().push(failure);
    }

    pub fn snapshot(&self) -> Vec<FieldFailure> {
        self.failures.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }

    /// Failures for a single field
    pub fn for_field(&self, field: &str) -> Vec<FieldFailure> {
        self.failures
            .lock()
            .iter()
            .filter(|failure| failure.field == field)
            .cloned()
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "errors": self.snapshot() })
    }
}

/// Failures recorded against `req`, or `None` if no chain ever ran on it.
pub fn results(req: &HttpRequest) -> Option<Vec<FieldFailure>> {
    ValidationResults::of(req).map(|results| results.snapshot())
}

/// 400 response listing `failures` as `{"errors": [...]}`.
pub fn failure_response(failures: &[FieldFailure]) -> Result<HttpResponse, Error> {
    HttpResponse::bad_request().with_json(&serde_json::json!({ "errors": failures }))
}
