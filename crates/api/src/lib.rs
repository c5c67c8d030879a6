//! HTTP API gateway: request parsing, dispatch, and the auth boundary.

pub mod app;
pub mod context;
pub mod gateway;
pub mod registry;
pub mod request;
pub mod response;
pub mod routes;
pub mod session;

pub use context::ApiContext;
pub use gateway::{dispatch, RawRequest};
pub use registry::{FnHandler, HandlerId, HandlerRegistry, RouteHandler};
pub use request::{QueryValue, RequestContext, RequestError};
pub use response::ApiResponse;
