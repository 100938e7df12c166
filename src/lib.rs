// Gauntlet - ordered validation chains for HTTP request fields
//
// Each chain takes one query parameter, header or cookie through a sequence
// of validators, actions and modifiers, collecting failures on the request.

// Re-export core functionality
pub use gauntlet_core::*;

// Logging macros and configuration
pub use gauntlet_log as log;

#[cfg(feature = "validation")]
pub use gauntlet_validation;

// Needed to implement `Middleware`, `Validator`, `Action` and `Modifier`
pub use async_trait::async_trait;
pub use serde_json;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Error, HttpRequest, HttpResponse, Middleware, MiddlewareChain, Next, RequestLocation,
        async_trait,
    };

    #[cfg(feature = "validation")]
    pub use gauntlet_validation::{
        Action, ChainBuilder, ChainOptions, Context, FieldFailure, LinkError, LinkInputs,
        Modifier, RequestValidator, ValidationChain, ValidationError, ValidationMiddleware,
        Validator, ValidatorRegistry, Verdict, failure_response, results,
    };
}
