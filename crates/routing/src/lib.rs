//! `gatehouse-routing` — path canonicalization and route dispatch.
//!
//! This crate is intentionally decoupled from HTTP framework types and from
//! authentication: it parses raw path strings into typed segments, holds the
//! immutable process-lifetime route table, and resolves (path, method) pairs
//! into bound route descriptors.

pub mod method;
pub mod path;
pub mod router;
pub mod table;

pub use method::{HttpMethod, InvalidMethodError};
pub use path::{ApiPath, PathParseError, PathSegment, PARAM_PLACEHOLDER};
pub use router::{BoundParams, RouteMatch, Router, RoutingError};
pub use table::{RouteDescriptor, RouteTable, RouteTableBuilder, TableError};
