//! An HTTP/1.1 source-input stream processor for a nukleus-style fabric
//! protocol adapter.
//!
//! This crate implements only the source (request) half of such an
//! adapter: decoding pipelined HTTP/1.1 requests off a single inbound
//! fabric stream, applying bidirectional credit-based flow control between
//! the source and the chosen downstream target, and handling `Upgrade`
//! passthrough. The fabric transport, route configuration, the paired
//! response-side stream, and process bootstrap are out of scope; this
//! crate reaches them only through the trait contracts in [`fabric`] and
//! [`route`].
//!
//! The entry point is [`proto::SourceInputStreamFactory`], which hands out
//! [`proto::SourceInputStream`]s sharing one [`slab::Slab`] and one
//! compaction scratch buffer.

pub mod config;
pub mod correlation;
pub mod error;
pub mod fabric;
pub mod proto;
pub mod route;
pub mod slab;

pub use config::Config;
pub use error::{Error, Result};
