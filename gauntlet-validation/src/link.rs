// Links: the typed steps a validation chain is made of

use crate::{Context, LinkError};
use async_trait::async_trait;
use gauntlet_core::HttpRequest;
use std::future::Future;
use std::sync::Arc;

/// Outcome of a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    /// Human readable description of what was expected, e.g. `"integer"`
    pub expected: String,
    /// Message proposed by the validator itself
    pub message: Option<String>,
}

impl Verdict {
    pub fn new(passed: bool, expected: impl Into<String>) -> Self {
        Self {
            passed,
            expected: expected.into(),
            message: None,
        }
    }

    pub fn pass(expected: impl Into<String>) -> Self {
        Self::new(true, expected)
    }

    pub fn fail(expected: impl Into<String>) -> Self {
        Self::new(false, expected)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Flip the outcome and prefix the expectation with `not`.
    pub fn negated(self) -> Self {
        Self {
            passed: !self.passed,
            expected: format!("not {}", self.expected),
            message: self.message,
        }
    }
}

/// What a link can see while it runs: the run context and the request
/// being validated.
pub struct LinkInputs<'a> {
    pub context: &'a mut Context,
    pub request: &'a HttpRequest,
}

impl<'a> LinkInputs<'a> {
    pub fn new(context: &'a mut Context, request: &'a HttpRequest) -> Self {
        Self { context, request }
    }
}

/// Checks the field value.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(
        &self,
        value: Option<&str>,
        inputs: &mut LinkInputs<'_>,
    ) -> Result<Verdict, LinkError>;
}

/// Changes run state without producing a verdict.
#[async_trait]
pub trait Action: Send + Sync {
    async fn act(
        &self,
        value: Option<&str>,
        inputs: &mut LinkInputs<'_>,
    ) -> Result<(), LinkError>;
}

/// Produces a replacement for the field value. `None` removes the field.
#[async_trait]
pub trait Modifier: Send + Sync {
    async fn modify(
        &self,
        value: Option<&str>,
        inputs: &mut LinkInputs<'_>,
    ) -> Result<Option<String>, LinkError>;
}

/// Kind tag of a [`Link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Validator,
    Action,
    Modifier,
}

/// The operation a link performs, one variant per kind.
#[derive(Clone)]
pub enum Operation {
    Validator(Arc<dyn Validator>),
    Action(Arc<dyn Action>),
    Modifier(Arc<dyn Modifier>),
}

/// One step of a validation chain.
#[derive(Clone)]
pub struct Link {
    operation: Operation,
    error: Option<String>,
}

impl Link {
    pub fn validator(validator: impl Validator + 'static) -> Self {
        Self::from_operation(Operation::Validator(Arc::new(validator)))
    }

    pub fn action(action: impl Action + 'static) -> Self {
        Self::from_operation(Operation::Action(Arc::new(action)))
    }

    pub fn modifier(modifier: impl Modifier + 'static) -> Self {
        Self::from_operation(Operation::Modifier(Arc::new(modifier)))
    }

    pub fn from_operation(operation: Operation) -> Self {
        Self {
            operation,
            error: None,
        }
    }

    pub fn kind(&self) -> LinkKind {
        match self.operation {
            Operation::Validator(_) => LinkKind::Validator,
            Operation::Action(_) => LinkKind::Action,
            Operation::Modifier(_) => LinkKind::Modifier,
        }
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Message recorded when this link fails, ahead of any chain-level message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("kind", &self.kind())
            .field("error", &self.error)
            .finish()
    }
}

// ========== Closure adapters ==========

/// Validator backed by a synchronous closure.
pub struct FnValidator<F>(pub F);

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(Option<&str>, &mut LinkInputs<'_>) -> Result<Verdict, LinkError> + Send + Sync,
{
    async fn validate(
        &self,
        value: Option<&str>,
        inputs: &mut LinkInputs<'_>,
    ) -> Result<Verdict, LinkError> {
        (self.0)(value, inputs)
    }
}

/// Validator backed by an async predicate over an owned copy of the value.
pub struct AsyncFnValidator<F> {
    expected: String,
    predicate: F,
}

impl<F> AsyncFnValidator<F> {
    pub fn new(expected: impl Into<String>, predicate: F) -> Self {
        Self {
            expected: expected.into(),
            predicate,
        }
    }
}

#[async_trait]
impl<F, Fut> Validator for AsyncFnValidator<F>
where
    F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, LinkError>> + Send + 'static,
{
    async fn validate(
        &self,
        value: Option<&str>,
        _inputs: &mut LinkInputs<'_>,
    ) -> Result<Verdict, LinkError> {
        let passed = (self.predicate)(value.map(str::to_string)).await?;
        Ok(Verdict::new(passed, self.expected.clone()))
    }
}

/// Action backed by a synchronous closure.
pub struct FnAction<F>(pub F);

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: Fn(Option<&str>, &mut Context) + Send + Sync,
{
    async fn act(
        &self,
        value: Option<&str>,
        inputs: &mut LinkInputs<'_>,
    ) -> Result<(), LinkError> {
        (self.0)(value, &mut *inputs.context);
        Ok(())
    }
}

/// Modifier backed by a synchronous closure.
pub struct FnModifier<F>(pub F);

#[async_trait]
impl<F> Modifier for FnModifier<F>
where
    F: Fn(Option<&str>) -> Option<String> + Send + Sync,
{
    async fn modify(
        &self,
        value: Option<&str>,
        _inputs: &mut LinkInputs<'_>,
    ) -> Result<Option<String>, LinkError> {
        Ok((self.0)(value))
    }
}

/// Modifier backed by an async closure over an owned copy of the value.
pub struct AsyncFnModifier<F>(pub F);

#[async_trait]
impl<F, Fut> Modifier for AsyncFnModifier<F>
where
    F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<String>, LinkError>> + Send + 'static,
{
    async fn modify(
        &self,
        value: Option<&str>,
        _inputs: &mut LinkInputs<'_>,
    ) -> Result<Option<String>, LinkError> {
        (self.0)(value.map(str::to_string)).await
    }
}
