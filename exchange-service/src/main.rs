//! Exchange service: HTTP/WebSocket front end over the matching engine.
//!
//! Wires together the engine, upstream market-data feeders, strategies,
//! and the REST/WS API. A single event loop drains the engine's trade and
//! order-update streams, records metrics, broadcasts trades to WebSocket
//! subscribers, and dispatches strategy callbacks whose orders re-enter
//! the engine.

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use engine::{EngineStreams, MarketData, MatchingEngine, Order, OrderStatus, OrderType};
use std::{
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod feeder;
mod metrics;
mod strategy;
mod types;
mod websocket;

use crate::config::ServiceConfig;
use feeder::MarketDataFeeder;
use metrics::ServiceMetrics;
use strategy::{MarketMaker, Strategy};
use types::*;

pub(crate) fn now_ns() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("MATCHX_CONFIG").unwrap_or_else(|_| "config".to_string());
    let (cfg, cfg_err) = match ServiceConfig::from_file(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(err) => (ServiceConfig::default(), Some(err)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cfg.logging.level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Some(err) = cfg_err {
        warn!(%config_path, error = %err, "config not loaded, using defaults");
    }

    let (engine, streams) = MatchingEngine::new();
    let engine = Arc::new(engine);
    let metrics = Arc::new(ServiceMetrics::new());
    let (trade_tx, _) = broadcast::channel(1000);

    // Books for configured symbols exist up front so clients can stream
    // depth before the first order arrives.
    for exchange in &cfg.exchanges {
        for symbol in &exchange.symbols {
            engine.register_symbol(symbol);
        }
    }

    // All feeders share one bounded channel into the event loop. The local
    // clone keeps the channel open even when no feeds are configured.
    let (md_tx, md_rx) = mpsc::channel(feeder::FEED_CHANNEL_CAPACITY);
    for exchange in cfg.exchanges.clone() {
        let feed = MarketDataFeeder::new(
            exchange.name,
            exchange.ws_url,
            exchange.symbols,
            md_tx.clone(),
        );
        tokio::spawn(feed.run());
    }

    let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();
    if let Some(symbol) = cfg.exchanges.first().and_then(|e| e.symbols.first()) {
        strategies.push(Box::new(MarketMaker::new(symbol.clone(), 10, 1)));
    }

    tokio::spawn(run_event_loop(
        streams,
        md_rx,
        engine.clone(),
        strategies,
        trade_tx.clone(),
        metrics.clone(),
    ));

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(export_metrics))
        .route("/symbols", get(list_symbols))
        .route("/symbols/:symbol/orderbook", get(get_orderbook))
        .route("/symbols/:symbol/depth", get(get_depth))
        .route("/symbols/:symbol/orders", post(submit_order))
        .route("/symbols/:symbol/orders/:order_id", delete(cancel_order))
        .route("/symbols/:symbol/trades/stream", get(trade_stream))
        .route("/symbols/:symbol/depth/stream", get(depth_stream))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            engine,
            trade_broadcaster: trade_tx,
            metrics,
            metrics_enabled: cfg.metrics.enabled,
        });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.server.port)).await?;
    info!(port = cfg.server.port, "exchange service listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Drains engine streams and the market-data channel, fanning events out to
/// metrics, the trade broadcaster, and strategies. Strategy orders re-enter
/// the engine from here.
async fn run_event_loop(
    mut streams: EngineStreams,
    mut market_data: mpsc::Receiver<MarketData>,
    engine: Arc<MatchingEngine>,
    mut strategies: Vec<Box<dyn Strategy>>,
    trade_broadcaster: broadcast::Sender<TradeEvent>,
    metrics: Arc<ServiceMetrics>,
) {
    loop {
        let orders: Vec<Order> = tokio::select! {
            Some(trade) = streams.trades.recv() => {
                metrics.record_trade();
                let _ = trade_broadcaster.send(TradeEvent {
                    symbol: trade.symbol.clone(),
                    trade: trade.clone(),
                    ts_ns: now_ns(),
                });
                strategies
                    .iter_mut()
                    .flat_map(|s| s.on_trade(&trade))
                    .collect()
            }
            Some(update) = streams.order_updates.recv() => {
                metrics.record_order_update();
                strategies
                    .iter_mut()
                    .flat_map(|s| s.on_order_update(&update))
                    .collect()
            }
            Some(data) = market_data.recv() => {
                metrics.record_feeder_message();
                strategies
                    .iter_mut()
                    .flat_map(|s| s.on_market_data(&data))
                    .collect()
            }
            else => break,
        };

        for mut order in orders {
            let started = Instant::now();
            engine.process_order(&mut order).await;
            metrics.record_order(&order.symbol, started.elapsed().as_nanos() as u64);
        }
    }

    info!("event loop ended");
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub engine: Arc<MatchingEngine>,
    pub trade_broadcaster: broadcast::Sender<TradeEvent>,
    pub metrics: Arc<ServiceMetrics>,
    pub metrics_enabled: bool,
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "matchx-exchange",
        "version": env!("CARGO_PKG_VERSION"),
        "ts_ns": now_ns(),
    }))
}

async fn export_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    if !state.metrics_enabled {
        return Err(AppError::MetricsDisabled);
    }

    let mut body = String::new();
    for (key, value) in state.metrics.export() {
        body.push_str(&format!("matchx_{key} {value}\n"));
    }
    let (trades_dropped, updates_dropped) = state.engine.dropped_events();
    body.push_str(&format!("matchx_trades_dropped {trades_dropped}\n"));
    body.push_str(&format!("matchx_order_updates_dropped {updates_dropped}\n"));

    Ok(body)
}

async fn list_symbols(State(state): State<AppState>) -> impl IntoResponse {
    let mut symbols = state.engine.symbols();
    symbols.sort();
    Json(SymbolsResponse { symbols })
}

async fn get_orderbook(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .engine
        .snapshot(&symbol)
        .await
        .ok_or(AppError::SymbolNotFound)?;

    Ok(Json(snapshot))
}

async fn get_depth(
    Path(symbol): Path<String>,
    Query(params): Query<DepthQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let levels = params.levels.unwrap_or(10);
    let mut snapshot = state
        .engine
        .snapshot(&symbol)
        .await
        .ok_or(AppError::SymbolNotFound)?;

    snapshot.bids.truncate(levels);
    snapshot.asks.truncate(levels);

    Ok(Json(snapshot))
}

async fn submit_order(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SubmitOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    // The engine is total over well-formed input, so validation lives here
    // at the producer boundary.
    if request.quantity <= 0 {
        return Err(AppError::InvalidOrder("quantity must be positive".into()));
    }
    let price = match request.order_type {
        OrderType::Limit => match request.price {
            Some(px) if px > 0 => px,
            _ => {
                return Err(AppError::InvalidOrder(
                    "limit orders need a positive price".into(),
                ))
            }
        },
        OrderType::Market => 0,
    };

    let mut order = Order {
        id: uuid::Uuid::new_v4().to_string(),
        symbol: symbol.clone(),
        side: request.side,
        order_type: request.order_type,
        px_ticks: price,
        qty: request.quantity,
        filled: 0,
        status: OrderStatus::Pending,
        ts_ns: 0, // Engine stamps arrival time
        client_id: request.client_id.unwrap_or_else(|| "api".to_string()),
    };

    let started = Instant::now();
    let trades = state.engine.process_order(&mut order).await;
    let elapsed = started.elapsed();
    state
        .metrics
        .record_order(&symbol, elapsed.as_nanos() as u64);

    // Broadcast trades to WebSocket subscribers
    for trade in &trades {
        let _ = state.trade_broadcaster.send(TradeEvent {
            symbol: symbol.clone(),
            trade: trade.clone(),
            ts_ns: now_ns(),
        });
    }

    let response = SubmitOrderResponse {
        order_id: order.id,
        status: order.status,
        filled: order.filled,
        trades,
        latency_us: elapsed.as_micros() as u64,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn cancel_order(
    Path((symbol, order_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if state.engine.cancel_order(&symbol, &order_id).await {
        state.metrics.record_cancel();
        Ok(Json(serde_json::json!({
            "status": "cancelled",
            "order_id": order_id,
        })))
    } else {
        Err(AppError::OrderNotFound)
    }
}

async fn trade_stream(
    Path(symbol): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| websocket::handle_trade_stream(socket, symbol, state))
}

async fn depth_stream(
    Path(symbol): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| websocket::handle_depth_stream(socket, symbol, state))
}

#[derive(Debug, Error)]
enum AppError {
    #[error("symbol not found")]
    SymbolNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("invalid order: {0}")]
    InvalidOrder(String),
    #[error("metrics are disabled")]
    MetricsDisabled,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::SymbolNotFound | AppError::OrderNotFound | AppError::MetricsDisabled => {
                StatusCode::NOT_FOUND
            }
            AppError::InvalidOrder(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
