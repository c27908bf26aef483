/*
[INPUT]:  BINANCE_API_KEY / BINANCE_API_SECRET environment variables
[OUTPUT]: Live account and order updates from the user-data stream
[POS]:    Examples - user-data stream subscription
[UPDATE]: When user stream event handling changes
*/

use std::time::Duration;

use binance_spot_adapter::*;

/// Example: Stream account and order updates (requires API credentials)
#[tokio::main]
async fn main() {
    println!("=== Binance User Stream Example ===\n");

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

    let listen_key = match client.start_user_stream().await {
        Ok(key) => key.listen_key,
        Err(e) => {
            eprintln!("Failed to start user stream: {}", e);
            return;
        }
    };
    println!("✓ Listen key obtained\n");

    let ws = BinanceWebSocket::new();

    if let Err(e) = ws
        .subscribe_user_account(&listen_key, |event| {
            for balance in &event.balances {
                println!("balance update: {} free={} locked={}", balance.asset, balance.free, balance.locked);
            }
        })
        .await
    {
        eprintln!("Account subscribe failed: {}", e);
        return;
    }

    if let Err(e) = ws
        .subscribe_user_orders(&listen_key, |event| {
            println!(
                "order update: {} {} {} -> {}",
                event.symbol, event.side, event.order_id, event.order_status
            );
        })
        .await
    {
        eprintln!("Order subscribe failed: {}", e);
        return;
    }

    println!("✓ Listening for 60 seconds (place an order to see events)...");
    tokio::time::sleep(Duration::from_secs(60)).await;

    ws.unsubscribe_all().await;
    let _ = client.close_user_stream(&listen_key).await;
    println!("\n✓ User stream example complete");
}
