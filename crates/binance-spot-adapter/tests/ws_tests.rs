/*
[INPUT]:  WebSocket test scenarios against local stream servers
[OUTPUT]: Test results for socket lifecycle and subscription registry
[POS]:    Integration tests - WebSocket
[UPDATE]: When socket lifecycle or routing changes
*/

mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use binance_spot_adapter::{BinanceError, BinanceWebSocket, TradeEvent};

use common::{spawn_closing_server, spawn_stream_server, wait_until};

fn trade_frame(trade_id: i64) -> String {
    format!(
        r#"{{"e":"trade","E":1,"s":"BTCUSDT","t":{trade_id},"p":"100.0","q":"1.0","T":2,"m":false}}"#
    )
}

#[tokio::test]
async fn test_topic_subscriptions_get_distinct_increasing_ids() {
    let (url, _connections) = spawn_stream_server(Vec::new()).await;
    let ws = BinanceWebSocket::with_base_url(&url);

    let first = ws
        .subscribe_trades("BTCUSDT", |_event: TradeEvent| {})
        .await
        .expect("first subscribe failed");
    let second = ws
        .subscribe_trades("ETHUSDT", |_event: TradeEvent| {})
        .await
        .expect("second subscribe failed");

    assert!(second > first);
    assert_eq!(ws.socket_count(), 2);

    // Closing one must leave the other's registry entry alone.
    ws.unsubscribe(first).await;
    assert_eq!(ws.open_socket_ids(), vec![second]);
}

#[tokio::test]
async fn test_failed_connect_still_consumes_an_id() {
    let (url, _connections) = spawn_stream_server(Vec::new()).await;
    let ws = BinanceWebSocket::with_base_url(&url);

    let before = ws
        .subscribe_trades("BTCUSDT", |_event: TradeEvent| {})
        .await
        .expect("subscribe failed");

    // A stream path that cannot form a valid URL fails as a value, not a
    // fault, and gets no registry entry.
    let err = ws
        .subscribe_topic::<TradeEvent, _>("bad topic with spaces", |_event| {})
        .await
        .unwrap_err();
    assert!(matches!(err, BinanceError::SocketOpenFailed(_)));
    assert_eq!(ws.socket_count(), 1);

    // The failed attempt consumed an id; ids are never recycled.
    let after = ws
        .subscribe_trades("ETHUSDT", |_event: TradeEvent| {})
        .await
        .expect("subscribe failed");
    assert_eq!(after, before + 2);

    // An address nobody listens on is the same expected outcome.
    let dead = BinanceWebSocket::with_base_url("ws://127.0.0.1:9");
    let err = dead
        .subscribe_trades("BTCUSDT", |_event: TradeEvent| {})
        .await
        .unwrap_err();
    assert!(matches!(err, BinanceError::SocketOpenFailed(_)));
    assert_eq!(dead.socket_count(), 0);
}

#[tokio::test]
async fn test_topic_messages_reach_the_handler_in_order() {
    let (url, _connections) =
        spawn_stream_server(vec![trade_frame(1), trade_frame(2), trade_frame(3)]).await;
    let ws = BinanceWebSocket::with_base_url(&url);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = Arc::clone(&seen);
    ws.subscribe_trades("BTCUSDT", move |event: TradeEvent| {
        seen_in_handler.lock().unwrap().push(event.trade_id);
    })
    .await
    .expect("subscribe failed");

    wait_until("all trades delivered", || seen.lock().unwrap().len() == 3).await;
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_remote_close_deregisters_exactly_once() {
    let url = spawn_closing_server().await;
    let ws = BinanceWebSocket::with_base_url(&url);

    let id = ws
        .subscribe_trades("BTCUSDT", |_event: TradeEvent| {})
        .await
        .expect("subscribe failed");

    wait_until("socket deregistered after remote close", || {
        ws.socket_count() == 0
    })
    .await;

    // A late unsubscribe for the already-removed handle is a no-op.
    ws.unsubscribe(id).await;
    assert_eq!(ws.socket_count(), 0);
}

#[tokio::test]
async fn test_user_data_reuses_one_transport() {
    let (url, connections) = spawn_stream_server(Vec::new()).await;
    let ws = BinanceWebSocket::with_base_url(&url);

    let first = ws
        .subscribe_user_account("listen-key", |_event| {})
        .await
        .expect("account subscribe failed");
    let second = ws
        .subscribe_user_orders("listen-key", |_event| {})
        .await
        .expect("orders subscribe failed");

    assert_eq!(first, second);
    assert_eq!(connections.load(Ordering::SeqCst), 1);
    assert_eq!(ws.socket_count(), 1);
}

#[tokio::test]
async fn test_user_data_closes_only_when_both_handlers_cleared() {
    let (url, connections) = spawn_stream_server(Vec::new()).await;
    let ws = BinanceWebSocket::with_base_url(&url);

    ws.subscribe_user_account("listen-key", |_event| {})
        .await
        .expect("account subscribe failed");
    ws.subscribe_user_orders("listen-key", |_event| {})
        .await
        .expect("orders subscribe failed");

    ws.unsubscribe_user_account().await;
    assert_eq!(ws.socket_count(), 1, "one handler left, socket must stay");

    ws.unsubscribe_user_orders().await;
    assert_eq!(ws.socket_count(), 0, "no handlers left, socket must close");
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_user_data_demux_routes_only_matching_events() {
    let frames = vec![
        r#"{"e":"outboundAccountPosition","E":10,"B":[{"a":"BTC","f":"1.0","l":"0.0"}]}"#.to_string(),
        r#"{"e":"someFutureEventType","E":11,"x":true}"#.to_string(),
        r#"{"e":"executionReport","E":12,"s":"BTCUSDT","c":"abc","S":"BUY","o":"LIMIT","q":"1.0","p":"100.0","x":"NEW","X":"NEW","i":55,"l":"0.0","z":"0.0","L":"0.0","T":13}"#.to_string(),
    ];
    let (url, _connections) = spawn_stream_server(frames).await;
    let ws = BinanceWebSocket::with_base_url(&url);

    let account_events = Arc::new(Mutex::new(Vec::new()));
    let order_events = Arc::new(Mutex::new(Vec::new()));

    let account_sink = Arc::clone(&account_events);
    ws.subscribe_user_account("listen-key", move |event| {
        account_sink.lock().unwrap().push(event.event_time);
    })
    .await
    .expect("account subscribe failed");

    let order_sink = Arc::clone(&order_events);
    ws.subscribe_user_orders("listen-key", move |event| {
        order_sink.lock().unwrap().push(event.order_id);
    })
    .await
    .expect("orders subscribe failed");

    wait_until("account event delivered", || {
        !account_events.lock().unwrap().is_empty()
    })
    .await;
    wait_until("order event delivered", || {
        !order_events.lock().unwrap().is_empty()
    })
    .await;

    assert_eq!(*account_events.lock().unwrap(), vec![10]);
    assert_eq!(*order_events.lock().unwrap(), vec![55]);
}

#[tokio::test]
async fn test_unsubscribe_all_clears_registry_and_handlers() {
    let (url, connections) = spawn_stream_server(Vec::new()).await;
    let ws = BinanceWebSocket::with_base_url(&url);

    ws.subscribe_trades("BTCUSDT", |_event: TradeEvent| {})
        .await
        .expect("subscribe failed");
    ws.subscribe_trades("ETHUSDT", |_event: TradeEvent| {})
        .await
        .expect("subscribe failed");
    ws.subscribe_user_account("listen-key", |_event| {})
        .await
        .expect("account subscribe failed");

    assert_eq!(ws.socket_count(), 3);
    ws.unsubscribe_all().await;
    assert_eq!(ws.socket_count(), 0);

    // A later account subscribe must open a fresh transport.
    ws.subscribe_user_account("listen-key", |_event| {})
        .await
        .expect("resubscribe failed");
    wait_until("new transport accepted", || {
        connections.load(Ordering::SeqCst) == 4
    })
    .await;
}
