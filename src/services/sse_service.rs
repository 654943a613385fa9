use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::SharedState,
};

const EVENT_CONNECTED: &str = "connected";

/// Subscribe to the admin event hub and build the `connected` event greeting the new client.
pub fn subscribe_admin(
    state: &SharedState,
) -> (broadcast::Receiver<ServerEvent>, Option<ServerEvent>) {
    let receiver = state.events().subscribe();
    let handshake = Handshake {
        message: "admin stream connected".into(),
        degraded: state.is_degraded(),
    };
    let greeting = match ServerEvent::json(EVENT_CONNECTED, &handshake) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize SSE handshake");
            None
        }
    };
    (receiver, greeting)
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response, sending `greeting` first and forwarding
/// events until the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    greeting: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(greeting) = greeting {
            if tx.send(Ok(to_event(greeting))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "admin SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!("admin SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn greeting_reports_degraded_mode() {
        let state = AppState::new(AppConfig::default());
        let (_receiver, greeting) = subscribe_admin(&state);
        let greeting = greeting.unwrap();
        assert_eq!(greeting.event.as_deref(), Some("connected"));
        let body: serde_json::Value = serde_json::from_str(&greeting.data).unwrap();
        assert_eq!(body["degraded"], true);
        assert_eq!(state.events().subscriber_count(), 1);
    }
}
