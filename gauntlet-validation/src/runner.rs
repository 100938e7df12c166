// Middleware adapter running validation chains ahead of a handler

use crate::{ValidationChain, ValidationError};
use async_trait::async_trait;
use gauntlet_core::{Error, HttpRequest, HttpResponse, Middleware, Next};
use gauntlet_log::{debug, error};
use std::sync::Arc;

/// Runs its chains against every request, then always passes the request on.
///
/// Failures only accumulate; handlers read them with [`results`](crate::results)
/// and decide what to do. A link fault is a bug, not a validation outcome, and
/// is returned as [`Error::Internal`] without calling `next`.
///
/// ```
/// use gauntlet_validation::{RequestValidator, ValidationMiddleware};
///
/// let validator = RequestValidator::new();
/// let middleware = ValidationMiddleware::new()
///     .chain(validator.query("id").exists().is_int().build())
///     .chain(validator.header("x-trace").exists().build());
///
/// assert_eq!(middleware.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ValidationMiddleware {
    chains: Vec<Arc<ValidationChain>>,
}

impl ValidationMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(mut self, chain: ValidationChain) -> Self {
        self.chains.push(Arc::new(chain));
        self
    }

    pub fn shared_chain(mut self, chain: Arc<ValidationChain>) -> Self {
        self.chains.push(chain);
        self
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Run every chain in order against `req`.
    pub async fn validate(&self, req: &mut HttpRequest) -> Result<usize, ValidationError> {
        let mut failures = 0;
        for chain in &self.chains {
            failures += chain.run(req).await?.failures;
        }
        Ok(failures)
    }
}

impl From<ValidationChain> for ValidationMiddleware {
    fn from(chain: ValidationChain) -> Self {
        Self::new().chain(chain)
    }
}

#[async_trait]
impl Middleware for ValidationMiddleware {
    async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        match self.validate(&mut req).await {
            Ok(failures) => {
                debug!(
                    "{} {}: {} validation failures from {} chains",
                    req.method,
                    req.path,
                    failures,
                    self.chains.len()
                );
                next(req).await
            }
            Err(e) => {
                error!("{} {}: validation aborted: {}", req.method, req.path, e);
                Err(Error::Internal(e.to_string()))
            }
        }
    }
}

/// Run a single chain as a pipeline step: validate, then continue with `next`.
pub async fn run_chain(
    chain: &ValidationChain,
    mut req: HttpRequest,
    next: Next,
) -> Result<HttpResponse, Error> {
    chain
        .run(&mut req)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;
    next(req).await
}
