//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - `convert` - Digest conversion and delivery
//! - `download` - Artifact download
//! - `system` - Root message, health, OpenAPI

mod convert;
mod download;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use convert::*;
pub use download::*;
pub use system::*;
