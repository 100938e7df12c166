// Core library for Gauntlet
// Host-facing request model, typed request extensions and the middleware contract

pub mod error;
pub mod extensions;
pub mod http;
pub mod middleware;

// Re-export commonly used types
pub use error::*;
pub use extensions::*;
pub use http::*;
pub use middleware::*;
