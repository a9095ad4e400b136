pub mod error_layer;
pub mod problem;

pub use problem::{Problem, ProblemResponse};
