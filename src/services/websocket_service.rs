use std::ops::ControlFlow;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    dto::ws::echo_text,
    state::{ConnectionId, NotificationHub, SharedState},
};

/// Handle the full lifecycle of a client WebSocket connection.
///
/// The connection is registered with the hub for its whole lifetime. Each text
/// frame is echoed to every connected client.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if sender.send(message).await.is_err() || closing {
                break;
            }
        }
    });

    let hub = state.hub().clone();
    let connection_id = hub.connect(outbound_tx.clone());
    info!(connection = %connection_id, total = hub.len(), "client connected");

    while let Some(message) = receiver.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                warn!(connection = %connection_id, error = %err, "websocket error");
                break;
            }
        };
        if dispatch_frame(&hub, connection_id, message, &outbound_tx).is_break() {
            break;
        }
    }

    hub.disconnect(connection_id);
    info!(connection = %connection_id, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// React to one inbound frame. Breaks when the client asked to close.
fn dispatch_frame(
    hub: &NotificationHub,
    connection_id: ConnectionId,
    message: Message,
    outbound_tx: &mpsc::UnboundedSender<Message>,
) -> ControlFlow<()> {
    match message {
        Message::Text(text) => {
            debug!(connection = %connection_id, payload = %text, "received client message");
            let delivered = hub.broadcast(&echo_text(&text));
            debug!(connection = %connection_id, delivered, "echo broadcast");
        }
        Message::Ping(payload) => {
            let _ = outbound_tx.send(Message::Pong(payload));
        }
        Message::Close(frame) => {
            info!(connection = %connection_id, "client closed");
            let _ = outbound_tx.send(Message::Close(frame));
            return ControlFlow::Break(());
        }
        Message::Binary(_) | Message::Pong(_) => {}
    }
    ControlFlow::Continue(())
}

async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
