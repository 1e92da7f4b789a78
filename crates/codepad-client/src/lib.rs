//! HTTP clients for the project backend and the code execution service.
//!
//! The [`ProjectApi`] and [`ExecutionService`] traits are the seams the
//! orchestration layer depends on; [`HttpProjectApi`] and [`ExecutionClient`]
//! are the reqwest-backed implementations. Wire shapes live in [`schema`].

pub mod api;
pub mod execution;
pub mod project_api;
pub mod schema;

pub use api::{ExecutionService, ProjectApi};
pub use execution::{ExecutionClient, DEFAULT_EXECUTE_URL};
pub use project_api::HttpProjectApi;
