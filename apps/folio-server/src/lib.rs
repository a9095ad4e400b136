//! Server assembly: provider wiring, module startup and the HTTP ingress.

pub mod ingress;
pub mod wiring;
