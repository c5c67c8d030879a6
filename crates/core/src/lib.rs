//! `gatehouse-core` — shared foundation for the gateway crates.
//!
//! This crate contains only transport- and storage-agnostic primitives:
//! strongly-typed identifiers and the opaque internal-error wrapper.

pub mod error;
pub mod id;

pub use error::InternalError;
pub use id::{RequestId, UserId};
