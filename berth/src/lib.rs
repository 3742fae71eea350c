//! An SMTP session engine.
//!
//! [smtp::Server] tracks one client conversation and enforces the order of
//! commands. Everything it cannot decide alone is asked of the
//! [responder::Responders] it was built with.

pub mod responder;
pub mod smtp;
