// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Manual chat client for exercising a running node
//!
//! ```text
//! cargo run --bin chat-client -- ws://127.0.0.1:8001/chat/local-test
//! ```
//!
//! Reads queries from stdin, streams tokens to stdout until the end-of-turn
//! sentinel arrives.

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use jetbay_rag_node::END_STREAM;
use std::env;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[tokio::main]
async fn main() -> Result<()> {
    let url = env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8001/chat/local-test".to_string());

    println!("Connecting to {}...", url);
    let (stream, _) = connect_async(&url)
        .await
        .context("WebSocket connection failed")?;
    let (mut write, mut read) = stream.split();
    println!("Connected. Type a query and press enter (Ctrl-D to quit).");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        write.send(Message::Text(query.to_string())).await?;

        while let Some(msg) = read.next().await {
            match msg? {
                Message::Text(text) if text == END_STREAM => {
                    println!();
                    break;
                }
                Message::Text(text) => {
                    print!("{}", text);
                    std::io::stdout().flush()?;
                }
                Message::Close(_) => {
                    println!("\nServer closed the connection");
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    Ok(())
}
