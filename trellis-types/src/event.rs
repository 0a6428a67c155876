//! Client events.
//!
//! The session layer notifies observers through an injected [`EventSink`]
//! rather than a global bus, which keeps the lifetime coupling explicit.

use crate::Token;

/// An event emitted by the client core.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The cached session token changed effectively (old != new).
    ///
    /// Emitted exactly once per effective change; writing the same value
    /// again is silent. Carries the new value, or `None` after
    /// deauthorization.
    AuthorizationStatusChanged {
        /// The new session token, if any.
        token: Option<Token>,
    },
}

/// Capability to publish client events to interested observers.
///
/// Emission is fire-and-forget with no acknowledgment. Implementations must
/// not block and must not call back into the emitting component: events can
/// be delivered from inside a short critical section.
pub trait EventSink: Send + Sync {
    /// Publishes one event.
    fn emit(&self, event: ClientEvent);
}

/// An event sink that drops everything.
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: ClientEvent) {}
}

/// Recording sink for tests.
pub mod mock {
    use super::{ClientEvent, EventSink};
    use std::sync::Mutex;

    /// Collects every emitted event for later inspection.
    #[derive(Debug, Default)]
    pub struct RecordingEventSink {
        events: Mutex<Vec<ClientEvent>>,
    }

    impl RecordingEventSink {
        /// Creates an empty recording sink.
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns a copy of everything emitted so far.
        pub fn events(&self) -> Vec<ClientEvent> {
            self.events.lock().unwrap().clone()
        }

        /// Number of events emitted so far.
        pub fn count(&self) -> usize {
            self.events.lock().unwrap().len()
        }
    }

    impl EventSink for RecordingEventSink {
        fn emit(&self, event: ClientEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}
