//! Request field validation chains for Gauntlet
//!
//! A chain validates one field of a request (a query parameter, a header or a
//! cookie) by running it through an ordered list of links:
//!
//! - **validators** check the value and record a [`FieldFailure`] when it is rejected,
//! - **actions** adjust the run [`Context`], e.g. `not()` negates the next validator,
//! - **modifiers** rewrite the value in the request for every link after them.
//!
//! Failures never abort anything. They accumulate per request and are read
//! back with [`results`].
//!
//! # Examples
//!
//! ## Declaring and running a chain
//!
//! ```
//! use gauntlet_core::HttpRequest;
//! use gauntlet_validation::{RequestValidator, results};
//!
//! # tokio_test::block_on(async {
//! let validator = RequestValidator::new();
//! let chain = validator
//!     .query("limit")
//!     .modify(|value| value.map(|v| v.trim().to_string()))
//!     .is_int()
//!     .error("limit must be a number")
//!     .build();
//!
//! let mut req = HttpRequest::new("GET".into(), "/items".into()).with_query("limit", "ten");
//! chain.run(&mut req).await.unwrap();
//!
//! let failures = results(&req).unwrap();
//! assert_eq!(failures[0].message, "limit must be a number");
//! assert_eq!(failures[0].expected, "integer");
//! assert_eq!(failures[0].got, "ten");
//! # });
//! ```
//!
//! ## Registering named validators
//!
//! ```
//! use gauntlet_validation::{RequestValidator, ValidatorRegistry};
//!
//! let mut registry = ValidatorRegistry::new();
//! registry
//!     .register("isEven", |v| v.and_then(|v| v.parse::<i64>().ok()).is_some_and(|n| n % 2 == 0))
//!     .unwrap();
//!
//! let validator = RequestValidator::new().with_registry(registry);
//! let chain = validator.query("count").check("isEven").unwrap().build();
//! assert_eq!(chain.links().len(), 1);
//! ```

mod builder;
mod chain;
mod config;
mod context;
mod errors;
mod link;
mod predicates;
mod registry;
mod results;
mod runner;

pub use builder::*;
pub use chain::*;
pub use config::*;
pub use context::*;
pub use errors::*;
pub use link::*;
pub use predicates::*;
pub use registry::*;
pub use results::*;
pub use runner::*;
