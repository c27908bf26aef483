/*
[INPUT]:  BINANCE_API_KEY / BINANCE_API_SECRET environment variables
[OUTPUT]: Signed order placement and account queries
[POS]:    Examples - authenticated trading flow
[UPDATE]: When adding new trading endpoints or changing order flow
*/

use binance_spot_adapter::*;

/// Example: Signed trading flow (requires API credentials)
///
/// Uses the order test endpoint so no real order reaches the book.
#[tokio::main]
async fn main() {
    println!("=== Binance Trading Example ===\n");

    let (Ok(api_key), Ok(api_secret)) = (
        std::env::var("BINANCE_API_KEY"),
        std::env::var("BINANCE_API_SECRET"),
    ) else {
        eprintln!("Set BINANCE_API_KEY and BINANCE_API_SECRET to run this example");
        return;
    };

    let mut client = match BinanceClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    client.set_credentials(Credential::new(api_key, api_secret));
    println!("✓ Client configured with credentials\n");

    println!("Syncing server clock...");
    match client.sync_clock().await {
        Ok(()) => println!("✓ Clock offset: {}ms", client.clock().offset_ms()),
        Err(e) => {
            println!("✗ Sync failed: {}", e);
            return;
        }
    }

    println!("\nQuerying account info...");
    match client.account_info().await {
        Ok(account) => {
            let non_zero = account
                .balances
                .iter()
                .filter(|b| !b.free.is_zero() || !b.locked.is_zero())
                .count();
            println!("✓ Can trade: {}, assets with balance: {}", account.can_trade, non_zero);
        }
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nValidating a limit order against the matching engine...");
    let order = NewOrder::limit(
        "BTCUSDT",
        OrderSide::Buy,
        "0.001".parse().unwrap(),
        "10000".parse().unwrap(),
    );
    match client.place_test_order(order).await {
        Ok(()) => println!("✓ Order accepted by validation"),
        Err(e) => println!("✗ Rejected: {} (code {})", e, e.code()),
    }

    println!("\n✓ Trading example complete");
}
