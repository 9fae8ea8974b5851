//! Upstream market-data feed client.
//!
//! Connects to a venue's WebSocket endpoint, subscribes to ticker topics,
//! and forwards parsed ticks into a bounded channel. Read failures trigger
//! a reconnect after a fixed backoff; a full channel drops the tick.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use engine::{MarketData, Side};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};

pub const FEED_CHANNEL_CAPACITY: usize = 10_000;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Price ticks per whole price unit (two decimal places).
const TICKS_PER_UNIT: f64 = 100.0;

pub struct MarketDataFeeder {
    name: String,
    ws_url: String,
    symbols: Vec<String>,
    tx: mpsc::Sender<MarketData>,
}

/// Upstream ticker payload; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct TickerMessage {
    #[serde(rename = "s", default)]
    symbol: String,
    #[serde(rename = "c", default)]
    price: String,
    #[serde(rename = "v", default)]
    volume: String,
}

impl MarketDataFeeder {
    pub fn new(
        name: impl Into<String>,
        ws_url: impl Into<String>,
        symbols: Vec<String>,
        tx: mpsc::Sender<MarketData>,
    ) -> Self {
        Self {
            name: name.into(),
            ws_url: ws_url.into(),
            symbols,
            tx,
        }
    }

    /// Runs the subscribe/read loop until the consumer side goes away.
    pub async fn run(self) {
        loop {
            match self.connect_and_stream().await {
                Ok(()) => info!(feed = %self.name, "market data stream closed"),
                Err(err) => error!(feed = %self.name, %err, "market data stream failed"),
            }

            if self.tx.is_closed() {
                return;
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
            info!(feed = %self.name, "reconnecting to market data feed");
        }
    }

    async fn connect_and_stream(&self) -> anyhow::Result<()> {
        let (mut ws, _) = connect_async(&self.ws_url).await?;
        info!(feed = %self.name, url = %self.ws_url, "connected to market data feed");

        for symbol in &self.symbols {
            let subscribe = json!({
                "method": "SUBSCRIBE",
                "params": [format!("{}@ticker", symbol.to_lowercase())],
                "id": 1,
            });
            ws.send(Message::Text(subscribe.to_string().into())).await?;
        }

        while let Some(msg) = ws.next().await {
            match msg? {
                Message::Text(text) => {
                    // Skip malformed or non-ticker messages
                    let Ok(ticker) = serde_json::from_str::<TickerMessage>(&text) else {
                        continue;
                    };
                    let Some(data) = parse_ticker(ticker) else {
                        continue;
                    };
                    if self.tx.try_send(data).is_err() {
                        warn!(feed = %self.name, "market data channel full, dropping tick");
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }

        Ok(())
    }
}

/// Converts an upstream ticker into engine units. Returns None when the
/// payload carries no usable symbol or price.
fn parse_ticker(ticker: TickerMessage) -> Option<MarketData> {
    if ticker.symbol.is_empty() {
        return None;
    }
    let price: f64 = ticker.price.parse().ok()?;
    if price <= 0.0 {
        return None;
    }
    let qty = ticker.volume.parse::<f64>().unwrap_or(0.0);

    Some(MarketData {
        symbol: ticker.symbol,
        px_ticks: (price * TICKS_PER_UNIT).round() as i64,
        qty: qty.round() as i64,
        side: Side::Buy,
        ts_ns: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos(),
    })
}
