/*
[INPUT]:  WebSocket connection and subscription requests
[OUTPUT]: Real-time market data and user stream events
[POS]:    WebSocket layer - streaming API communication
[UPDATE]: When adding new stream kinds or changing connection logic
*/

pub mod client;
pub mod message;

pub use client::{BinanceWebSocket, StreamRole};
pub use message::{
    AccountUpdateEvent, AggTradeEvent, DepthEvent, KlineEvent, OrderUpdateEvent, StreamBalance,
    StreamDepthLevel, StreamKline, TradeEvent,
};
