//! WebSocket handlers for real-time market data streaming.
//!
//! Streams trade executions and top-of-book updates per symbol. Uses
//! tokio::select! for concurrent handling of client messages, broadcasts,
//! and heartbeats.

use axum::extract::ws::{Message, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::{now_ns, types::*, AppState};

/// Handles real-time trade streaming for a symbol.
///
/// Forwards trade events as they execute, with ping/pong heartbeat for
/// connection health.
pub async fn handle_trade_stream(socket: WebSocket, symbol: String, state: AppState) {
    info!(%symbol, "new trade stream connection");

    let (mut sender, mut receiver) = socket.split();
    let mut trade_rx = state.trade_broadcaster.subscribe();
    let mut ping_interval = interval(Duration::from_secs(30));

    loop {
        tokio::select! {
            // Handle incoming WebSocket messages
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(WebSocketMessage::Ping { ts_ns }) =
                            serde_json::from_str::<WebSocketMessage>(&text)
                        {
                            let pong = WebSocketMessage::Pong { ts_ns };
                            if let Ok(pong_json) = serde_json::to_string(&pong) {
                                let _ = sender.send(Message::Text(pong_json)).await;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!(%symbol, "trade stream connection closed");
                        break;
                    }
                    Some(Ok(_)) => {} // Ignore binary and pong
                    Some(Err(e)) => {
                        error!(%symbol, error = %e, "websocket error in trade stream");
                        break;
                    }
                    None => break,
                }
            }

            // Forward trade broadcasts for this symbol
            trade_result = trade_rx.recv() => {
                match trade_result {
                    Ok(trade_event) => {
                        if trade_event.symbol == symbol {
                            let ws_msg = WebSocketMessage::Trade(trade_event);
                            if let Ok(json) = serde_json::to_string(&ws_msg) {
                                if sender.send(Message::Text(json)).await.is_err() {
                                    warn!(%symbol, "failed to send trade update");
                                    break;
                                }
                            }
                        }
                    }
                    Err(_) => break, // Channel closed/lagged
                }
            }

            // Periodic heartbeat pings
            _ = ping_interval.tick() => {
                let ping = WebSocketMessage::Ping { ts_ns: now_ns() };
                if let Ok(ping_json) = serde_json::to_string(&ping) {
                    if sender.send(Message::Text(ping_json)).await.is_err() {
                        break; // Connection broken
                    }
                }
            }
        }
    }

    info!(%symbol, "trade stream handler ended");
}

/// Handles top-of-book streaming for a symbol.
///
/// Polls at 10 Hz but only sends when the best prices change. Sends an
/// initial update on connection.
pub async fn handle_depth_stream(socket: WebSocket, symbol: String, state: AppState) {
    info!(%symbol, "new depth stream connection");

    let (mut sender, mut receiver) = socket.split();
    let mut update_interval = interval(Duration::from_millis(100)); // 10 Hz
    let mut ping_interval = interval(Duration::from_secs(30));

    // Send initial snapshot
    if let Some(update) = build_depth_update(&state, &symbol).await {
        let ws_msg = WebSocketMessage::Depth(update);
        if let Ok(json) = serde_json::to_string(&ws_msg) {
            let _ = sender.send(Message::Text(json)).await;
        }
    }

    // Track last sent prices to avoid redundant updates
    let mut last_best_bid: Option<i64> = None;
    let mut last_best_ask: Option<i64> = None;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(WebSocketMessage::Ping { ts_ns }) =
                            serde_json::from_str::<WebSocketMessage>(&text)
                        {
                            let pong = WebSocketMessage::Pong { ts_ns };
                            if let Ok(pong_json) = serde_json::to_string(&pong) {
                                let _ = sender.send(Message::Text(pong_json)).await;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!(%symbol, "depth stream connection closed");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(%symbol, error = %e, "websocket error in depth stream");
                        break;
                    }
                    None => break,
                }
            }

            // Send depth updates only when prices change
            _ = update_interval.tick() => {
                if let Some(update) = build_depth_update(&state, &symbol).await {
                    if update.best_bid != last_best_bid || update.best_ask != last_best_ask {
                        last_best_bid = update.best_bid;
                        last_best_ask = update.best_ask;

                        let ws_msg = WebSocketMessage::Depth(update);
                        if let Ok(json) = serde_json::to_string(&ws_msg) {
                            if sender.send(Message::Text(json)).await.is_err() {
                                warn!(%symbol, "failed to send depth update");
                                break;
                            }
                        }
                    }
                }
            }

            // Periodic heartbeat pings
            _ = ping_interval.tick() => {
                let ping = WebSocketMessage::Ping { ts_ns: now_ns() };
                if let Ok(ping_json) = serde_json::to_string(&ping) {
                    if sender.send(Message::Text(ping_json)).await.is_err() {
                        break; // Connection broken
                    }
                }
            }
        }
    }

    info!(%symbol, "depth stream handler ended");
}

/// Top-of-book view from the current snapshot, or None for unknown symbols.
async fn build_depth_update(state: &AppState, symbol: &str) -> Option<DepthUpdate> {
    let snapshot = state.engine.snapshot(symbol).await?;

    Some(DepthUpdate {
        symbol: symbol.to_string(),
        best_bid: snapshot.bids.first().map(|l| l.price),
        best_ask: snapshot.asks.first().map(|l| l.price),
        bid_size: snapshot.bids.first().map(|l| l.quantity).unwrap_or(0),
        ask_size: snapshot.asks.first().map(|l| l.quantity).unwrap_or(0),
        ts_ns: snapshot.ts_ns,
    })
}
