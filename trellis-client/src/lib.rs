//! HTTP request seam for the Trellis client.
//!
//! The session and sync layers never talk to the network directly; they go
//! through the narrow [`Requestor`] trait defined here. This crate also
//! ships the production implementation ([`HttpRequestor`], backed by
//! reqwest) and a scriptable mock for tests ([`requestor::mock`]).
//!
//! Responses follow the service's envelope: a `data` payload (array or
//! keyed object) next to a `metadata` object carrying model versions and
//! pagination, plus any top-level fields such as `token` or `mfa` on the
//! session endpoints.

mod error;
mod http;
pub mod requestor;

pub use error::{ClientError, ClientResult};
pub use http::{HttpConfig, HttpRequestor};
pub use requestor::{
    Method, Request, Requestor, Response, TokenSource, UnauthorizedObserver,
};
