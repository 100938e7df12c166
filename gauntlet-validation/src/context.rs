// Per-run state shared by the links of one chain run

use std::collections::HashMap;

/// Mutable state created fresh for every chain run.
///
/// Actions use it to steer the links that follow them: [`negate`](Self::negate)
/// inverts the next validator, [`set_error`](Self::set_error) changes the
/// message recorded for later failures, and `locals` carries arbitrary data
/// from one link to another.
#[derive(Debug, Clone, Default)]
pub struct Context {
    negated: bool,
    error: Option<String>,
    locals: HashMap<String, serde_json::Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with the chain-level message override.
    pub(crate) fn with_error(error: Option<String>) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }

    /// Invert the outcome of the next validator.
    pub fn negate(&mut self) {
        self.negated = true;
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Read and clear the negation flag.
    pub(crate) fn take_negation(&mut self) -> bool {
        std::mem::take(&mut self.negated)
    }

    /// Chain-level message override for failures recorded during this run.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn local(&self, key: &str) -> Option<&serde_json::Value> {
        self.locals.get(key)
    }

    pub fn set_local(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.locals.insert(key.into(), value.into());
    }

    pub fn locals(&self) -> &HashMap<String, serde_json::Value> {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut HashMap<String, serde_json::Value> {
        &mut self.locals
    }
}
