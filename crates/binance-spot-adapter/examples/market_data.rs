/*
[INPUT]:  Symbol identifier (e.g., "BTCUSDT")
[OUTPUT]: Market data (price, depth, klines)
[POS]:    Examples - public market data queries
[UPDATE]: When adding new market data endpoints
*/

use binance_spot_adapter::*;

/// Example: Query market data (no authentication required)
#[tokio::main]
async fn main() {
    println!("=== Binance Market Data Example ===\n");

    let client = match BinanceClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created (no auth required for public endpoints)\n");

    let symbol = "BTCUSDT";

    println!("Pinging the exchange...");
    match client.ping().await {
        Ok(()) => println!("✓ Exchange reachable"),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying price for {}...", symbol);
    match client.price(symbol).await {
        Ok(price) => println!("✓ Price: {:?}", price),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying order book for {}...", symbol);
    match client.order_book(symbol, Some(5)).await {
        Ok(book) => {
            println!("✓ Best bid: {:?}", book.bids.first());
            println!("✓ Best ask: {:?}", book.asks.first());
        }
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying hourly klines for {}...", symbol);
    match client
        .klines(symbol, KlineInterval::OneHour, Some(3), None, None)
        .await
    {
        Ok(klines) => {
            for kline in &klines {
                println!("✓ open={} close={} volume={}", kline.open(), kline.close(), kline.volume());
            }
        }
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Market data example complete");
}
