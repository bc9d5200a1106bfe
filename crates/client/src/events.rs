//! Session and notice broadcasts.
//!
//! Replaces the ambient "listen for a global storage event" pattern with
//! explicit observer registration: interested parties call
//! [`EventHub::subscribe_session`] or [`EventHub::subscribe_notices`] and
//! hold the receiver for as long as they care. Dropping the receiver is the
//! teardown, there is nothing else to unregister.

use tokio::sync::broadcast;

/// Capacity of the broadcast channels; laggy observers lose old events,
/// which is acceptable for change notifications.
const CHANNEL_CAPACITY: usize = 16;

/// The session flipped between anonymous and authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A token was stored (login succeeded).
    SignedIn,
    /// The token was cleared (logout, or the backend rejected it).
    SignedOut,
}

/// A user-facing notice. The client only produces the values; rendering
/// them (toast, status line, dialog) is the frontend's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The session was torn down; the user should be sent to sign in.
    SignInRequired {
        /// View the frontend should navigate to.
        redirect: &'static str,
    },
}

/// Broadcast hub for session changes and user notices.
#[derive(Debug, Clone)]
pub struct EventHub {
    session_tx: broadcast::Sender<SessionEvent>,
    notice_tx: broadcast::Sender<Notice>,
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        let (session_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (notice_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            session_tx,
            notice_tx,
        }
    }

    /// Register for session-changed notifications.
    #[must_use]
    pub fn subscribe_session(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_tx.subscribe()
    }

    /// Register for user-facing notices.
    #[must_use]
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    /// Broadcast a session change. No subscribers is fine.
    pub fn session_changed(&self, event: SessionEvent) {
        let _ = self.session_tx.send(event);
    }

    /// Broadcast a user-facing notice. No subscribers is fine.
    pub fn notify(&self, notice: Notice) {
        let _ = self.notice_tx.send(notice);
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_receive_session_events() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe_session();

        hub.session_changed(SessionEvent::SignedOut);
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::SignedOut);
    }

    #[test]
    fn test_events_before_subscription_are_not_replayed() {
        let hub = EventHub::new();
        hub.session_changed(SessionEvent::SignedIn);

        let mut rx = hub.subscribe_session();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_deterministic_teardown() {
        let hub = EventHub::new();
        let rx = hub.subscribe_notices();
        drop(rx);

        // Sending with no live subscribers must not panic or error out
        hub.notify(Notice::SignInRequired { redirect: "/signin" });
    }
}
