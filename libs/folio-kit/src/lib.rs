//! Shared HTTP plumbing for Folio modules: problem responses, module contracts,
//! the provider registry, request middleware and outgoing traced calls.

pub mod api;
pub mod auth;
pub mod client_hub;
pub mod context;
pub mod contracts;
pub mod http;
pub mod shutdown;

pub use api::problem::{Problem, ProblemResponse};
pub use auth::{AccessToken, BearerToken};
pub use client_hub::ClientHub;
pub use context::{ConfigProvider, ModuleCtx};
pub use contracts::{Module, RestfulModule};
