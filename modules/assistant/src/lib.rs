// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::Assistant;

// === INTERNAL MODULES ===
// Exposed for tests; other crates should stick to `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
