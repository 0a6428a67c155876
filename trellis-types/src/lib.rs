//! Core type definitions for the Trellis client.
//!
//! This crate defines the fundamental types shared by the session and
//! synchronization layers:
//! - Entity identifiers (MUIDs) and the opaque session [`Token`]
//! - The object-graph entities ([`Space`], [`Media`], [`Link`]) in their
//!   wire form
//! - Client events and the [`EventSink`] capability
//!
//! Everything that performs I/O lives in the other crates; this one is pure
//! data.

pub mod event;
mod ids;
mod object;

pub use event::{ClientEvent, EventSink, NullEventSink};
pub use ids::{Muid, Token};
pub use object::{Link, Media, ObjectState, Space};
