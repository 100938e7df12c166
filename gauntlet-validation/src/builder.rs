// Fluent construction of validation chains

use crate::registry::describe;
use crate::{
    Action, AsyncFnModifier, AsyncFnValidator, ChainOptions, Context, FnAction, FnModifier,
    FnValidator, IntOptions, Link, LinkError, LinkInputs, Modifier, Predicates, Result,
    StandardPredicates, ValidationChain, ValidationConfig, ValidationError, Validator,
    ValidatorRegistry, Verdict,
};
use gauntlet_core::RequestLocation;
use std::future::Future;
use std::sync::Arc;

/// Entry point for declaring chains.
///
/// Holds what every chain built from it shares: default options, the
/// predicate library behind the built-in checks, and the registry of named
/// validators.
///
/// ```
/// use gauntlet_validation::RequestValidator;
///
/// let validator = RequestValidator::new();
/// let page = validator.query("page").not().exists().build();
/// let limit = validator.query("limit").is_int().error("limit must be a number").build();
///
/// assert_eq!(page.links().len(), 2);
/// assert_eq!(limit.field(), "limit");
/// ```
#[derive(Clone)]
pub struct RequestValidator {
    options: ChainOptions,
    predicates: Arc<dyn Predicates>,
    registry: Arc<ValidatorRegistry>,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self {
            options: ChainOptions::default(),
            predicates: Arc::new(StandardPredicates::default()),
            registry: Arc::new(ValidatorRegistry::new()),
        }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new().with_options(config.chain_options())
    }

    pub fn with_options(mut self, options: ChainOptions) -> Self {
        self.options = options;
        self
    }

    /// Swap the predicate library used by `is_int`, `is_float` and friends.
    pub fn with_predicates(mut self, predicates: impl Predicates + 'static) -> Self {
        self.predicates = Arc::new(predicates);
        self
    }

    pub fn with_registry(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    pub fn query(&self, field: impl Into<String>) -> ChainBuilder {
        self.field(RequestLocation::Query, field)
    }

    pub fn header(&self, field: impl Into<String>) -> ChainBuilder {
        self.field(RequestLocation::Header, field)
    }

    pub fn cookie(&self, field: impl Into<String>) -> ChainBuilder {
        self.field(RequestLocation::Cookie, field)
    }

    pub fn field(&self, location: RequestLocation, field: impl Into<String>) -> ChainBuilder {
        ChainBuilder {
            chain: ValidationChain::new(location, field, self.options),
            predicates: self.predicates.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends links to a chain, one per method call.
///
/// Finish with [`build`](Self::build).
pub struct ChainBuilder {
    chain: ValidationChain,
    predicates: Arc<dyn Predicates>,
    registry: Arc<ValidatorRegistry>,
}

impl ChainBuilder {
    /// Append a prebuilt link.
    pub fn link(mut self, link: Link) -> Self {
        self.chain.push(link);
        self
    }

    /// Stop at the first failing validator.
    pub fn bail(mut self, bail: bool) -> Self {
        self.chain.set_bail(bail);
        self
    }

    /// Invert the next validator.
    pub fn not(self) -> Self {
        self.act(|_, context| context.negate())
    }

    /// The field must be present.
    pub fn exists(self) -> Self {
        self.validate(|value, _| Ok(Verdict::new(value.is_some(), "existent")))
    }

    /// Alias of [`exists`](Self::exists).
    pub fn is_existent(self) -> Self {
        self.exists()
    }

    pub fn is_int(self) -> Self {
        self.is_int_with(IntOptions::default())
    }

    pub fn is_int_with(self, options: IntOptions) -> Self {
        let predicates = self.predicates.clone();
        self.validate(move |value, _| {
            Ok(Verdict::new(predicates.is_int(value, &options), "integer"))
        })
    }

    pub fn is_float(self) -> Self {
        let predicates = self.predicates.clone();
        self.validate(move |value, _| Ok(Verdict::new(predicates.is_float(value), "float")))
    }

    pub fn is_boolean(self) -> Self {
        let predicates = self.predicates.clone();
        self.validate(move |value, _| Ok(Verdict::new(predicates.is_boolean(value), "boolean")))
    }

    pub fn is_containing(self, needle: impl Into<String>) -> Self {
        let predicates = self.predicates.clone();
        let needle = needle.into();
        let expected = format!("containing {}", needle);
        self.validate(move |value, _| {
            Ok(Verdict::new(
                predicates.contains(value, &needle),
                expected.clone(),
            ))
        })
    }

    /// Ad hoc predicate. A camelCase `name` becomes the expectation text the
    /// way registered names do; anything else is used verbatim.
    pub fn is<F>(self, name: &str, predicate: F) -> Self
    where
        F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
    {
        let expected = expectation(name);
        self.validate(move |value, _| Ok(Verdict::new(predicate(value), expected.clone())))
    }

    /// Ad hoc predicate that suspends, e.g. to look the value up elsewhere.
    pub fn is_async<F, Fut>(self, name: &str, predicate: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<bool, LinkError>> + Send + 'static,
    {
        self.validate_with(AsyncFnValidator::new(expectation(name), predicate))
    }

    /// Run the validator registered under `name`.
    pub fn check(self, name: &str) -> Result<Self> {
        let registered = self
            .registry
            .get(name)
            .ok_or_else(|| ValidationError::UnknownValidator(name.to_string()))?;
        let expected = registered.expected().to_string();
        let predicate = registered.predicate();

        Ok(self.validate(move |value, _| Ok(Verdict::new(predicate(value), expected.clone()))))
    }

    /// Validator with full access to the verdict and run inputs.
    pub fn validate<F>(self, validator: F) -> Self
    where
        F: Fn(Option<&str>, &mut LinkInputs<'_>) -> std::result::Result<Verdict, LinkError>
            + Send
            + Sync
            + 'static,
    {
        self.validate_with(FnValidator(validator))
    }

    pub fn validate_with(self, validator: impl Validator + 'static) -> Self {
        self.link(Link::validator(validator))
    }

    /// Message for failures of the last link, or for the whole chain when no
    /// link has been added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.chain.last_link_mut() {
            Some(link) => link.set_error(message),
            None => self.chain.set_error(message),
        }
        self
    }

    /// Replace the field value for the links that follow.
    pub fn modify<F>(self, modifier: F) -> Self
    where
        F: Fn(Option<&str>) -> Option<String> + Send + Sync + 'static,
    {
        self.modify_with(FnModifier(modifier))
    }

    pub fn modify_async<F, Fut>(self, modifier: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Option<String>, LinkError>> + Send + 'static,
    {
        self.modify_with(AsyncFnModifier(modifier))
    }

    pub fn modify_with(self, modifier: impl Modifier + 'static) -> Self {
        self.link(Link::modifier(modifier))
    }

    /// Act on the run context, e.g. to set a message or stash a local.
    pub fn act<F>(self, action: F) -> Self
    where
        F: Fn(Option<&str>, &mut Context) + Send + Sync + 'static,
    {
        self.act_with(FnAction(action))
    }

    pub fn act_with(self, action: impl Action + 'static) -> Self {
        self.link(Link::action(action))
    }

    pub fn build(self) -> ValidationChain {
        self.chain
    }
}

fn expectation(name: &str) -> String {
    if crate::registry::is_camel_case(name) {
        describe(name)
    } else {
        name.to_string()
    }
}
