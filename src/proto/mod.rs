//! The HTTP/1.1 source-input state machines.
//!
//! [`stream`] holds the bulk of the logic — it drives [`decode`] and
//! [`throttle`] against a single connection's [`crate::slab::Slab`] slot.
//! [`factory`] is the entry point that wires a fresh stream up with its
//! shared collaborators.

pub(crate) mod canned;
mod decode;
pub(crate) mod factory;
mod parse;
pub mod stream;
pub mod throttle;

pub use factory::SourceInputStreamFactory;
pub use stream::{Collaborators, SourceInputStream};
pub use throttle::ThrottleState;
