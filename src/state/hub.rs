//! Registry of live WebSocket connections and the fan-out of lobby events.

use axum::extract::ws::{Message, Utf8Bytes};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dto::ws::LobbyEvent;

/// Identifier handed out to each registered connection.
pub type ConnectionId = Uuid;

/// Destination for lobby events emitted after a successful commit.
pub trait EventSink: Send + Sync {
    /// Deliver `event` to every interested listener. Never fails the caller.
    fn publish(&self, event: &LobbyEvent);
}

/// Set of connected clients, each reachable through its writer task channel.
#[derive(Debug, Default)]
pub struct NotificationHub {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

impl NotificationHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an outbound channel and return its identifier.
    pub fn connect(&self, sender: mpsc::UnboundedSender<Message>) -> ConnectionId {
        let id = Uuid::new_v4();
        self.connections.insert(id, sender);
        debug!(connection = %id, total = self.connections.len(), "connection registered");
        id
    }

    /// Remove a connection. Returns `false` when it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    /// Send `text` to every connection and return how many accepted it.
    ///
    /// Connections whose writer is gone are pruned after the pass.
    pub fn broadcast(&self, text: &str) -> usize {
        let payload = Utf8Bytes::from(text.to_owned());
        let mut delivered = 0;
        let mut dead = Vec::new();

        for entry in self.connections.iter() {
            match entry.value().send(Message::Text(payload.clone())) {
                Ok(()) => delivered += 1,
                Err(_) => dead.push(*entry.key()),
            }
        }

        for id in dead {
            self.connections.remove(&id);
            debug!(connection = %id, "pruned closed connection");
        }

        delivered
    }

    /// Close every connection and empty the registry.
    pub fn close_all(&self) {
        for entry in self.connections.iter() {
            let _ = entry.value().send(Message::Close(None));
        }
        self.connections.clear();
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl EventSink for NotificationHub {
    fn publish(&self, event: &LobbyEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, ?event, "failed to serialize lobby event");
                return;
            }
        };

        let delivered = self.broadcast(&payload);
        debug!(?event, delivered, "lobby event published");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(message: Message) -> String {
        match message {
            Message::Text(text) => text.as_str().to_owned(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[test]
    fn broadcast_reaches_each_connection_once() {
        let hub = NotificationHub::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        hub.connect(tx_a);
        hub.connect(tx_b);

        assert_eq!(hub.broadcast("hello"), 2);

        assert_eq!(text_of(rx_a.try_recv().unwrap()), "hello");
        assert_eq!(text_of(rx_b.try_recv().unwrap()), "hello");
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn disconnected_client_receives_nothing() {
        let hub = NotificationHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.connect(tx);

        assert!(hub.disconnect(id));
        assert!(!hub.disconnect(id));
        assert_eq!(hub.broadcast("hello"), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dead_connection_is_pruned_without_aborting_broadcast() {
        let hub = NotificationHub::new();
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        let (live_tx, mut live_rx) = mpsc::unbounded_channel();
        hub.connect(dead_tx);
        hub.connect(live_tx);
        drop(dead_rx);

        assert_eq!(hub.broadcast("ping"), 1);
        assert_eq!(hub.len(), 1);
        assert_eq!(text_of(live_rx.try_recv().unwrap()), "ping");
    }

    #[test]
    fn publish_serializes_event_as_tagged_json() {
        let hub = NotificationHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.connect(tx);
        let game_id = Uuid::new_v4();

        hub.publish(&LobbyEvent::GameDeleted { game_id });

        let value: serde_json::Value =
            serde_json::from_str(&text_of(rx.try_recv().unwrap())).unwrap();
        assert_eq!(value["event"], "game_deleted");
        assert_eq!(value["game_id"], game_id.to_string());
    }

    #[test]
    fn close_all_sends_close_and_empties() {
        let hub = NotificationHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.connect(tx);

        hub.close_all();

        assert!(hub.is_empty());
        assert!(matches!(rx.try_recv().unwrap(), Message::Close(None)));
    }
}
