use clap::{Parser, Subcommand};
use engine::{OrderType, Side};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "matchx-cli")]
#[command(about = "matchx CLI - Command line client for the exchange service")]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Submit {
        #[arg(short = 's', long)]
        symbol: String,
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(short = 't', long, default_value = "limit", value_parser = parse_order_type)]
        order_type: OrderType,
        #[arg(short = 'p', long)]
        price: Option<i64>,
        #[arg(short = 'q', long)]
        quantity: i64,
        #[arg(short = 'c', long)]
        client: Option<String>,
    },
    Status {
        #[arg(short, long)]
        symbol: Option<String>,
    },
    Health,
    Symbols,
    Metrics,
    Depth {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "10")]
        levels: usize,
    },
    Cancel {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long)]
        order_id: String,
    },
}

#[derive(Serialize)]
struct SubmitOrderRequest {
    side: Side,
    #[serde(rename = "type")]
    order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<i64>,
    quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
}

#[derive(Deserialize)]
struct SubmitOrderResponse {
    order_id: String,
    status: String,
    filled: i64,
    trades: Vec<Trade>,
    latency_us: u64,
}

#[derive(Deserialize)]
struct Trade {
    qty: i64,
    px_ticks: i64,
}

#[derive(Deserialize)]
struct SymbolsResponse {
    symbols: Vec<String>,
}

#[derive(Deserialize)]
struct BookSnapshot {
    symbol: String,
    bids: Vec<BookLevel>,
    asks: Vec<BookLevel>,
}

#[derive(Deserialize)]
struct BookLevel {
    price: i64,
    quantity: i64,
    orders: usize,
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s.to_lowercase().as_str() {
        "buy" | "bid" => Ok(Side::Buy),
        "sell" | "ask" => Ok(Side::Sell),
        _ => Err(format!("Invalid side: {}. Use 'buy' or 'sell'", s)),
    }
}

fn parse_order_type(s: &str) -> Result<OrderType, String> {
    match s.to_lowercase().as_str() {
        "limit" => Ok(OrderType::Limit),
        "market" => Ok(OrderType::Market),
        _ => Err(format!("Invalid order type: {}. Use 'limit' or 'market'", s)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Submit {
            symbol,
            side,
            order_type,
            price,
            quantity,
            client: client_id,
        } => {
            let request = SubmitOrderRequest {
                side,
                order_type,
                price,
                quantity,
                client_id,
            };

            let response = client
                .post(format!("{}/symbols/{}/orders", cli.server, symbol))
                .json(&request)
                .send()
                .await?;

            if response.status().is_success() {
                let result: SubmitOrderResponse = response.json().await?;

                println!("Order ID: {}", result.order_id);
                println!("Status: {}", result.status);
                println!("Filled: {}", result.filled);
                println!("Latency: {}us", result.latency_us);

                if !result.trades.is_empty() {
                    println!("Trades executed: {}", result.trades.len());
                    for trade in result.trades {
                        println!("  {} lots @ {} ticks", trade.qty, trade.px_ticks);
                    }
                }
            } else {
                println!("Error: {}", response.status());
                println!("{}", response.text().await?);
            }
        }

        Commands::Status { symbol } => match symbol {
            Some(sym) => {
                let response = client
                    .get(format!("{}/symbols/{}/orderbook", cli.server, sym))
                    .send()
                    .await?;

                if response.status().is_success() {
                    let snapshot: BookSnapshot = response.json().await?;
                    println!("Symbol: {}", snapshot.symbol);
                    println!("Best Bid: {:?}", snapshot.bids.first().map(|l| l.price));
                    println!("Best Ask: {:?}", snapshot.asks.first().map(|l| l.price));
                    println!("Bid Levels: {}", snapshot.bids.len());
                    println!("Ask Levels: {}", snapshot.asks.len());
                } else {
                    println!("Error: {}", response.status());
                }
            }
            None => {
                let response = client.get(format!("{}/symbols", cli.server)).send().await?;

                if response.status().is_success() {
                    let symbols: SymbolsResponse = response.json().await?;
                    println!("Active symbols:");
                    for symbol in symbols.symbols {
                        let state_response = client
                            .get(format!("{}/symbols/{}/orderbook", cli.server, symbol))
                            .send()
                            .await?;

                        if state_response.status().is_success() {
                            let snapshot: BookSnapshot = state_response.json().await?;
                            println!(
                                "  {}: bid={:?}, ask={:?}",
                                symbol,
                                snapshot.bids.first().map(|l| l.price),
                                snapshot.asks.first().map(|l| l.price)
                            );
                        }
                    }
                } else {
                    println!("Error: {}", response.status());
                }
            }
        },

        Commands::Health => {
            let response = client.get(format!("{}/health", cli.server)).send().await?;

            if response.status().is_success() {
                let health: serde_json::Value = response.json().await?;
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("Error: {}", response.status());
            }
        }

        Commands::Symbols => {
            let response = client.get(format!("{}/symbols", cli.server)).send().await?;

            if response.status().is_success() {
                let symbols: SymbolsResponse = response.json().await?;
                for symbol in symbols.symbols {
                    println!("{}", symbol);
                }
            } else {
                println!("Error: {}", response.status());
            }
        }

        Commands::Metrics => {
            let response = client.get(format!("{}/metrics", cli.server)).send().await?;

            if response.status().is_success() {
                print!("{}", response.text().await?);
            } else {
                println!("Error: {}", response.status());
            }
        }

        Commands::Depth { symbol, levels } => {
            let response = client
                .get(format!(
                    "{}/symbols/{}/depth?levels={}",
                    cli.server, symbol, levels
                ))
                .send()
                .await?;

            if response.status().is_success() {
                let depth: BookSnapshot = response.json().await?;

                println!("Market Depth for {}", depth.symbol);
                println!("\nAsks:");
                for (i, level) in depth.asks.iter().enumerate() {
                    println!(
                        "  {}: {} @ {} ({} orders)",
                        i + 1,
                        level.quantity,
                        level.price,
                        level.orders
                    );
                }

                println!("\nBids:");
                for (i, level) in depth.bids.iter().enumerate() {
                    println!(
                        "  {}: {} @ {} ({} orders)",
                        i + 1,
                        level.quantity,
                        level.price,
                        level.orders
                    );
                }
            } else {
                println!("Error: {}", response.status());
            }
        }

        Commands::Cancel { symbol, order_id } => {
            let response = client
                .delete(format!(
                    "{}/symbols/{}/orders/{}",
                    cli.server, symbol, order_id
                ))
                .send()
                .await?;

            if response.status().is_success() {
                let result: serde_json::Value = response.json().await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Error: {}", response.status());
                println!("{}", response.text().await?);
            }
        }
    }

    Ok(())
}
