//! # Web Layer
//!
//! Explicit handler registration on top of axum. Each handler declares its
//! parameters in a `HandlerDescriptor`; the binder fills exactly those from
//! the request and the router turns handler results into responses.

pub mod binder;
pub mod descriptor;
pub mod errors;
pub mod handler;
pub mod reply;
pub mod request;
pub mod router;

pub use binder::bind;
pub use descriptor::{HandlerDescriptor, HandlerProfile, ParamKind};
pub use errors::{WebError, WebResult};
pub use handler::{CallArgs, HandlerError, HandlerResult};
pub use reply::Reply;
pub use request::RequestContext;
pub use router::{Route, RouteTable};
