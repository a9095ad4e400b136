pub mod avatar;
pub mod error;
pub mod guard;
pub mod service;
