// Validation chain and its run algorithm

use crate::{
    Context, FieldFailure, Link, LinkInputs, Operation, Result, UNDEFINED, ValidationError,
    ValidationResults, Verdict,
};
use gauntlet_core::{HttpRequest, RequestLocation};
use gauntlet_log::{debug, error, trace};
use serde::{Deserialize, Serialize};

/// Message recorded when neither the link nor the run supplies one.
pub const DEFAULT_MESSAGE: &str = "invalid value";

/// Per-chain options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainOptions {
    /// Stop at the first failing validator
    pub bail: bool,
}

/// Lifecycle of a chain run, reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Pending,
    Running,
    Completed,
}

/// How a run reached `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every link ran
    Exhausted,
    /// A validator failed with `bail` set
    Bailed,
}

/// Summary of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub status: RunStatus,
    /// Links that were dispatched, including the one that bailed
    pub links_run: usize,
    /// Failure records appended by this run
    pub failures: usize,
}

/// An ordered list of links bound to one request field.
///
/// Chains are immutable once built and can be run against any number of
/// requests, concurrently if needed: every run gets its own [`Context`].
#[derive(Debug, Clone)]
pub struct ValidationChain {
    location: RequestLocation,
    field: String,
    links: Vec<Link>,
    options: ChainOptions,
    error: Option<String>,
}

impl ValidationChain {
    pub fn new(location: RequestLocation, field: impl Into<String>, options: ChainOptions) -> Self {
        Self {
            location,
            field: field.into(),
            links: Vec::new(),
            options,
            error: None,
        }
    }

    pub(crate) fn push(&mut self, link: Link) {
        self.links.push(link);
    }

    pub(crate) fn last_link_mut(&mut self) -> Option<&mut Link> {
        self.links.last_mut()
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub(crate) fn set_bail(&mut self, bail: bool) {
        self.options.bail = bail;
    }

    pub fn location(&self) -> RequestLocation {
        self.location
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn options(&self) -> ChainOptions {
        self.options
    }

    /// Chain-level message override
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Run every link against `req`, appending failures to the request's
    /// [`ValidationResults`].
    ///
    /// The field is re-read before each link so that modifiers are visible to
    /// everything after them. A fault raised by a link aborts the run; failures
    /// recorded before it stay in the list.
    pub async fn run(&self, req: &mut HttpRequest) -> Result<RunReport> {
        let results = ValidationResults::ensure(req);
        let mut context = Context::with_error(self.error.clone());
        let mut report = RunReport {
            status: RunStatus::Exhausted,
            links_run: 0,
            failures: 0,
        };

        debug!(
            "chain {}.{}: {:?} -> {:?} ({} links)",
            self.location,
            self.field,
            ChainState::Pending,
            ChainState::Running,
            self.links.len()
        );

        for (index, link) in self.links.iter().enumerate() {
            let value = req.field(self.location, &self.field).cloned();
            report.links_run += 1;
            trace!(
                "chain {}.{}: link {} ({:?})",
                self.location,
                self.field,
                index,
                link.kind()
            );

            match link.operation() {
                Operation::Action(action) => {
                    let mut inputs = LinkInputs::new(&mut context, req);
                    action
                        .act(value.as_deref(), &mut inputs)
                        .await
                        .map_err(|source| self.fault(index, source))?;
                }
                Operation::Modifier(modifier) => {
                    let replacement = {
                        let mut inputs = LinkInputs::new(&mut context, req);
                        modifier
                            .modify(value.as_deref(), &mut inputs)
                            .await
                            .map_err(|source| self.fault(index, source))?
                    };
                    req.set_field(self.location, &self.field, replacement);
                }
                Operation::Validator(validator) => {
                    let verdict = {
                        let mut inputs = LinkInputs::new(&mut context, req);
                        validator
                            .validate(value.as_deref(), &mut inputs)
                            .await
                            .map_err(|source| self.fault(index, source))?
                    };
                    let verdict = if context.take_negation() {
                        verdict.negated()
                    } else {
                        verdict
                    };
                    if verdict.passed {
                        continue;
                    }

                    let failure = FieldFailure {
                        message: self.resolve_message(link, &context, &verdict),
                        location: self.location.as_str().to_string(),
                        field: self.field.clone(),
                        expected: verdict.expected,
                        got: value.unwrap_or_else(|| UNDEFINED.to_string()),
                    };
                    debug!("chain {}.{}: {}", self.location, self.field, failure);
                    results.push(failure);
                    report.failures += 1;

                    if self.options.bail {
                        report.status = RunStatus::Bailed;
                        break;
                    }
                }
            }
        }

        debug!(
            "chain {}.{}: {:?} -> {:?} ({:?}, {} failures)",
            self.location,
            self.field,
            ChainState::Running,
            ChainState::Completed,
            report.status,
            report.failures
        );
        Ok(report)
    }

    fn resolve_message(&self, link: &Link, context: &Context, verdict: &Verdict) -> String {
        link.error()
            .or_else(|| context.error())
            .or(verdict.message.as_deref())
            .unwrap_or(DEFAULT_MESSAGE)
            .to_string()
    }

    fn fault(&self, index: usize, source: crate::LinkError) -> ValidationError {
        error!(
            "chain {}.{}: link {} failed: {}",
            self.location, self.field, index, source
        );
        ValidationError::LinkFault {
            location: self.location,
            field: self.field.clone(),
            index,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FnAction, FnModifier, FnValidator, LinkError, results};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn is_digits(expected: &'static str) -> Link {
        Link::validator(FnValidator(
            move |value: Option<&str>, _: &mut LinkInputs<'_>| {
                let passed = value.is_some_and(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()));
                Ok::<_, LinkError>(Verdict::new(passed, expected))
            },
        ))
    }

    fn negate() -> Link {
        Link::action(FnAction(|_: Option<&str>, ctx: &mut Context| ctx.negate()))
    }

    fn counting(counter: Arc<AtomicUsize>) -> Link {
        Link::action(FnAction(move |_: Option<&str>, _: &mut Context| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn request(id: Option<&str>) -> HttpRequest {
        let req = HttpRequest::new("GET".to_string(), "/items".to_string());
        match id {
            Some(id) => req.with_query("id", id),
            None => req,
        }
    }

    fn chain(links: Vec<Link>, bail: bool) -> ValidationChain {
        let mut chain = ValidationChain::new(RequestLocation::Query, "id", ChainOptions { bail });
        for link in links {
            chain.push(link);
        }
        chain
    }

    #[tokio::test]
    async fn test_run_without_links_creates_empty_results() {
        let mut req = request(Some("1"));
        let report = chain(Vec::new(), false).run(&mut req).await.unwrap();

        assert_eq!(report.links_run, 0);
        assert_eq!(results(&req), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_every_failure_recorded_without_bail() {
        let mut req = request(Some("abc"));
        let chain = chain(vec![is_digits("digits"), is_digits("number")], false);

        let report = chain.run(&mut req).await.unwrap();

        assert_eq!(report.status, RunStatus::Exhausted);
        assert_eq!(report.failures, 2);
        let failures = results(&req).unwrap();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].expected, "digits");
        assert_eq!(failures[1].expected, "number");
        assert_eq!(failures[0].got, "abc");
        assert_eq!(failures[0].location, "query");
    }

    #[tokio::test]
    async fn test_bail_stops_after_first_failure() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut req = request(Some("abc"));
        let chain = chain(
            vec![is_digits("digits"), counting(counter.clone()), is_digits("number")],
            true,
        );

        let report = chain.run(&mut req).await.unwrap();

        assert_eq!(report.status, RunStatus::Bailed);
        assert_eq!(report.links_run, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(results(&req).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_negation_applies_to_next_validator_only() {
        let mut req = request(Some("abc"));
        let chain = chain(
            vec![negate(), is_digits("digits"), is_digits("number")],
            false,
        );

        chain.run(&mut req).await.unwrap();

        let failures = results(&req).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].expected, "number");
    }

    #[tokio::test]
    async fn test_negated_failure_rewrites_expected() {
        let mut req = request(Some("42"));
        chain(vec![negate(), is_digits("integer")], false)
            .run(&mut req)
            .await
            .unwrap();

        let failures = results(&req).unwrap();
        assert_eq!(failures[0].expected, "not integer");
    }

    #[tokio::test]
    async fn test_negation_survives_modifier_until_validator() {
        let mut req = request(Some(" 42 "));
        let trim = Link::modifier(FnModifier(|v: Option<&str>| v.map(|v| v.trim().to_string())));
        chain(vec![negate(), trim, is_digits("integer")], false)
            .run(&mut req)
            .await
            .unwrap();

        assert_eq!(results(&req).unwrap()[0].expected, "not integer");
    }

    #[tokio::test]
    async fn test_trailing_negation_is_a_no_op() {
        let mut req = request(None);
        let report = chain(vec![negate()], false).run(&mut req).await.unwrap();

        assert_eq!(report.failures, 0);
        assert!(results(&req).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negation_does_not_leak_between_runs() {
        let chain = chain(vec![is_digits("integer"), negate()], false);

        let mut first = request(Some("7"));
        chain.run(&mut first).await.unwrap();
        assert!(results(&first).unwrap().is_empty());

        // the negation left pending by the first run must not flip this one
        let mut second = request(Some("7"));
        chain.run(&mut second).await.unwrap();
        assert!(results(&second).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_modifier_writes_back_and_is_visible() {
        let mut req = request(Some(" 42 "));
        let trim = Link::modifier(FnModifier(|v: Option<&str>| v.map(|v| v.trim().to_string())));
        chain(vec![trim, is_digits("integer")], false)
            .run(&mut req)
            .await
            .unwrap();

        assert!(results(&req).unwrap().is_empty());
        assert_eq!(req.query("id"), Some(&"42".to_string()));
    }

    #[tokio::test]
    async fn test_modifier_returning_none_removes_field() {
        let mut req = request(Some("x"));
        let drop = Link::modifier(FnModifier(|_: Option<&str>| None));
        chain(vec![drop, is_digits("integer")], false)
            .run(&mut req)
            .await
            .unwrap();

        assert_eq!(req.query("id"), None);
        assert_eq!(results(&req).unwrap()[0].got, UNDEFINED);
    }

    #[tokio::test]
    async fn test_message_precedence() {
        let mut link_level = is_digits("integer");
        link_level.set_error("bad id");

        let mut with_both = chain(vec![link_level.clone()], false);
        with_both.set_error("bad field".to_string());
        let mut req = request(Some("x"));
        with_both.run(&mut req).await.unwrap();
        assert_eq!(results(&req).unwrap()[0].message, "bad id");

        let mut chain_only = chain(vec![is_digits("integer")], false);
        chain_only.set_error("bad field".to_string());
        let mut req = request(Some("x"));
        chain_only.run(&mut req).await.unwrap();
        assert_eq!(results(&req).unwrap()[0].message, "bad field");

        let mut req = request(Some("x"));
        chain(vec![is_digits("integer")], false)
            .run(&mut req)
            .await
            .unwrap();
        assert_eq!(results(&req).unwrap()[0].message, DEFAULT_MESSAGE);
    }

    #[tokio::test]
    async fn test_validator_message_used_before_default() {
        let link = Link::validator(FnValidator(|_: Option<&str>, _: &mut LinkInputs<'_>| {
            Ok::<_, LinkError>(Verdict::fail("even").with_message("must be even"))
        }));
        let mut req = request(Some("3"));
        chain(vec![link], false).run(&mut req).await.unwrap();

        assert_eq!(results(&req).unwrap()[0].message, "must be even");
    }

    #[tokio::test]
    async fn test_link_fault_aborts_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let faulty = Link::validator(FnValidator(|_: Option<&str>, _: &mut LinkInputs<'_>| {
            Err::<Verdict, LinkError>("lookup failed".into())
        }));
        let chain = chain(
            vec![is_digits("integer"), faulty, counting(counter.clone())],
            false,
        );
        let mut req = request(Some("x"));

        let err = chain.run(&mut req).await.unwrap_err();

        assert!(matches!(err, ValidationError::LinkFault { index: 1, .. }));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        // failures recorded before the fault are kept
        assert_eq!(results(&req).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validators_read_context_locals() {
        let remember = Link::action(FnAction(|value: Option<&str>, ctx: &mut Context| {
            ctx.set_local("original", value.unwrap_or_default());
        }));
        let same_as_original = Link::validator(FnValidator(
            |value: Option<&str>, inputs: &mut LinkInputs<'_>| {
                let original = inputs.context.local("original").and_then(|v| v.as_str());
                Ok::<_, LinkError>(Verdict::new(original == value, "unchanged"))
            },
        ));
        let upper = Link::modifier(FnModifier(|v: Option<&str>| v.map(str::to_uppercase)));

        let mut req = request(Some("abc"));
        chain(vec![remember, upper, same_as_original], false)
            .run(&mut req)
            .await
            .unwrap();

        let failures = results(&req).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].got, "ABC");
    }
}
