/*
[INPUT]:  Raw WebSocket message payloads
[OUTPUT]: Typed stream event structs
[POS]:    WebSocket layer - stream payload definitions
[UPDATE]: When adding new stream types or changing event format
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Event-type markers carried in the `"e"` field of user-data payloads.
pub(crate) const EVENT_ACCOUNT_POSITION: &str = "outboundAccountPosition";
pub(crate) const EVENT_ACCOUNT_INFO: &str = "outboundAccountInfo";
pub(crate) const EVENT_EXECUTION_REPORT: &str = "executionReport";

/// Kline stream event (`<symbol>@kline_<interval>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "k")]
    pub kline: StreamKline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamKline {
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "T")]
    pub close_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "i")]
    pub interval: String,
    #[serde(rename = "o", with = "rust_decimal::serde::str")]
    pub open: Decimal,
    #[serde(rename = "c", with = "rust_decimal::serde::str")]
    pub close: Decimal,
    #[serde(rename = "h", with = "rust_decimal::serde::str")]
    pub high: Decimal,
    #[serde(rename = "l", with = "rust_decimal::serde::str")]
    pub low: Decimal,
    #[serde(rename = "v", with = "rust_decimal::serde::str")]
    pub volume: Decimal,
    #[serde(rename = "n")]
    pub trade_count: i64,
    #[serde(rename = "x")]
    pub is_final: bool,
}

/// Diff depth stream event (`<symbol>@depth`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "U")]
    pub first_update_id: i64,
    #[serde(rename = "u")]
    pub final_update_id: i64,
    #[serde(rename = "b")]
    pub bids: Vec<StreamDepthLevel>,
    #[serde(rename = "a")]
    pub asks: Vec<StreamDepthLevel>,
}

/// `[price, quantity]` pair on depth streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDepthLevel(
    #[serde(with = "rust_decimal::serde::str")] pub Decimal,
    #[serde(with = "rust_decimal::serde::str")] pub Decimal,
);

/// Raw trade stream event (`<symbol>@trade`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "t")]
    pub trade_id: i64,
    #[serde(rename = "p", with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(rename = "q", with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(rename = "T")]
    pub trade_time: i64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
}

/// Aggregated trade stream event (`<symbol>@aggTrade`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggTradeEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "a")]
    pub agg_trade_id: i64,
    #[serde(rename = "p", with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(rename = "q", with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(rename = "f")]
    pub first_trade_id: i64,
    #[serde(rename = "l")]
    pub last_trade_id: i64,
    #[serde(rename = "T")]
    pub trade_time: i64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
}

/// Balance snapshot entry on account update events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamBalance {
    #[serde(rename = "a")]
    pub asset: String,
    #[serde(rename = "f", with = "rust_decimal::serde::str")]
    pub free: Decimal,
    #[serde(rename = "l", with = "rust_decimal::serde::str")]
    pub locked: Decimal,
}

/// Account update on the user-data stream
/// (`outboundAccountPosition`, or `outboundAccountInfo` on older sessions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdateEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "B")]
    pub balances: Vec<StreamBalance>,
}

/// Order execution report on the user-data stream (`executionReport`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdateEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "c")]
    pub client_order_id: String,
    #[serde(rename = "S")]
    pub side: String,
    #[serde(rename = "o")]
    pub order_type: String,
    #[serde(rename = "q", with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(rename = "p", with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(rename = "x")]
    pub execution_type: String,
    #[serde(rename = "X")]
    pub order_status: String,
    #[serde(rename = "i")]
    pub order_id: i64,
    #[serde(rename = "l", with = "rust_decimal::serde::str")]
    pub last_filled_qty: Decimal,
    #[serde(rename = "z", with = "rust_decimal::serde::str")]
    pub cumulative_filled_qty: Decimal,
    #[serde(rename = "L", with = "rust_decimal::serde::str")]
    pub last_filled_price: Decimal,
    #[serde(rename = "T")]
    pub transaction_time: i64,
}
