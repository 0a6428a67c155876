//! Session token lifecycle for the Trellis client.
//!
//! This crate owns exactly one piece of mutable state: the account's session
//! token. Everything else is a collaborator injected at construction — the
//! [`Requestor`](trellis_client::Requestor) that performs the network
//! exchanges, the [`SecureTokenStore`] that persists the token, and the
//! [`EventSink`](trellis_types::EventSink) observers subscribe through.
//!
//! # Lifecycle
//!
//! 1. **Bootstrap**: restore a persisted token at process start, retrying
//!    transient store failures with an escalating delay.
//! 2. **Authorize**: credentials, onboarding-token, or retry-token flows,
//!    all funneled through one serialized exchange against
//!    `sessions/create`.
//! 3. **Deauthorize**: best-effort server invalidation; local state is
//!    cleared whatever the server answers.
//!
//! Exactly one [`ClientEvent::AuthorizationStatusChanged`](trellis_types::ClientEvent)
//! is emitted per effective token change; writing the same value again is
//! silent.

mod account;
mod cell;
mod manager;
pub mod store;

pub use account::{Account, AccountService};
pub use cell::TokenCell;
pub use manager::{
    AuthOutcome, Credentials, MfaChallenge, TokenManager, TokenManagerConfig,
};
pub use store::{AccessPolicy, SecureTokenStore, StoreRead, StoreStatus};
