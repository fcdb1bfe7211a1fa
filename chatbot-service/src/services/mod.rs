pub mod bootstrap;
pub mod metrics;
pub mod responders;

pub use bootstrap::{BootstrapOutcome, ResourceBootstrap};
pub use responders::{EchoResponder, HttpResponder, Responder, ResponderError};
