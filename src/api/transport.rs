// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! WebSocket implementation of the chat transport
//!
//! Adapts an axum WebSocket to the `ChatTransport` trait the session loop
//! runs against. Pings are answered inline; binary frames are ignored.

use axum::extract::ws::{Message, WebSocket};

use crate::session::{ChatTransport, StreamFrame, TransportError};

/// Chat transport over one axum WebSocket
pub struct WebSocketTransport {
    socket: WebSocket,
}

impl WebSocketTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait::async_trait]
impl ChatTransport for WebSocketTransport {
    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.socket.recv().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text)),
                Some(Ok(Message::Ping(data))) => {
                    if self.socket.send(Message::Pong(data)).await.is_err() {
                        return Some(Err(TransportError::Closed));
                    }
                }
                Some(Ok(Message::Close(_))) => return None,
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Some(Err(TransportError::Protocol(e.to_string()))),
                None => return None,
            }
        }
    }

    async fn send(&mut self, frame: StreamFrame) -> Result<(), TransportError> {
        self.socket
            .send(Message::Text(frame.into_text()))
            .await
            .map_err(|e| TransportError::Protocol(e.to_string()))
    }
}
