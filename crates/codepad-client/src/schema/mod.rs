//! Request/response bodies exchanged with the external services.
//!
//! - [`project`]: backend project API (`getProject`, `saveProject`)
//! - [`execute`]: piston-compatible execution API

pub mod execute;
pub mod project;
