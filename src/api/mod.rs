// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP/WebSocket API surface
//!
//! One health route plus the per-user chat WebSocket endpoint.

pub mod server;
pub mod transport;

pub use server::start_server;
pub use transport::WebSocketTransport;
