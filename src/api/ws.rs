use std::{net::SocketAddr, time::Duration};

use axum::{
    Extension,
    extract::{
        ConnectInfo, State, WebSocketUpgrade,
        ws::{self, WebSocket},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use serde::{Deserialize, Serialize};
use tokio::{
    select,
    sync::broadcast::{Receiver, error::RecvError},
    time::timeout,
};
use tower_http::request_id::RequestId;
use tracing::{Instrument, info, info_span, warn};

use crate::event::Transferred;

use super::Env;

const MAX_SEND_MILLIS: u64 = 1000;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Event { event: Transferred },
    Error { error: String },
}

async fn send(socket: &mut WebSocket, response: &Response) -> bool {
    let text = match serde_json::to_string(response) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            return false;
        }
    };
    matches!(
        timeout(
            Duration::from_millis(MAX_SEND_MILLIS),
            socket.send(ws::Message::Text(text.into())),
        )
        .await,
        Ok(Ok(()))
    )
}

pub async fn handle_socket(socket: WebSocket, env: Env, addr: SocketAddr, request_id: String) {
    let span = info_span!("socket", id = %request_id, client_addr = %addr);
    let receiver = env.event_subscriber.subscribe();
    serve(socket, env, receiver).instrument(span).await;
}

async fn serve(mut socket: WebSocket, env: Env, mut receiver: Receiver<Transferred>) {
    info!("New WebSocket connection");
    loop {
        select! {
            _ = env.cancel_token.cancelled() => {
                info!("WebSocket connection cancelled");
                break;
            },
            result = receiver.recv() => match result {
                Ok(event) => {
                    if !send(&mut socket, &Response::Event { event }).await {
                        warn!("Failed to send event: connection closed");
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    warn!("Subscriber lagged, dropped {} event(s)", n);
                    let error = Response::Error {
                        error: format!("Dropped {} event(s)", n),
                    };
                    if !send(&mut socket, &error).await {
                        break;
                    }
                }
                Err(RecvError::Closed) => {
                    info!("Event channel closed");
                    break;
                }
            },
            message = socket.recv() => match message {
                Some(Ok(ws::Message::Ping(data))) => {
                    if timeout(
                        Duration::from_millis(MAX_SEND_MILLIS),
                        socket.send(ws::Message::Pong(data)),
                    )
                    .await
                    .is_err()
                    {
                        warn!("Failed to send pong: connection closed");
                        break;
                    }
                }
                Some(Ok(ws::Message::Pong(_))) => {}
                Some(Ok(ws::Message::Close(_))) => {
                    info!("Received close message");
                    break;
                }
                Some(Ok(_)) => {
                    info!("Received unsupported message");
                    let error = Response::Error {
                        error: "Requests are not supported".to_string(),
                    };
                    if !send(&mut socket, &error).await {
                        warn!("Failed to send error: connection closed");
                        break;
                    }
                }
                Some(Err(e)) => {
                    info!("Error receiving message: {}", e);
                    break;
                }
                None => break,
            }
        }
    }

    let _ = socket.close().await;
    info!("WebSocket connection closed");
}

pub async fn handler(
    ws: WebSocketUpgrade,
    State(env): State<Env>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(request_id): Extension<RequestId>,
) -> impl IntoResponse {
    let request_id = request_id
        .header_value()
        .to_str()
        .unwrap_or("unknown")
        .to_string();
    ws.on_upgrade(move |socket| handle_socket(socket, env, addr, request_id))
}
