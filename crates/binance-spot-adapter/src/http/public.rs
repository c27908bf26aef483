/*
[INPUT]:  Symbol identifiers and query parameters
[OUTPUT]: Market data (prices, depth, trades, klines)
[POS]:    HTTP layer - public market data endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
[UPDATE]: 2026-07-18 Added v3 ticker endpoints alongside the v1 market data set
*/

use reqwest::Method;

use crate::http::client::QueryParams;
use crate::http::{BinanceClient, Result};
use crate::types::{
    BookTicker, Empty, Kline, KlineInterval, OrderBook, ServerTime, SymbolPrice, Ticker24h, Trade,
};

impl BinanceClient {
    /// Test connectivity
    ///
    /// GET /v1/ping
    pub async fn ping(&self) -> Result<()> {
        let _: Empty = self
            .send_request(Method::GET, 1, "ping", QueryParams::new(), false, false)
            .await?;
        Ok(())
    }

    /// Current server time
    ///
    /// GET /v1/time
    pub async fn server_time(&self) -> Result<ServerTime> {
        self.send_request(Method::GET, 1, "time", QueryParams::new(), false, false)
            .await
    }

    /// Order book depth
    ///
    /// GET /v1/depth?symbol={symbol}&limit={limit}
    pub async fn order_book(&self, symbol: &str, limit: Option<u32>) -> Result<OrderBook> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        params.push_opt("limit", limit);
        self.send_request(Method::GET, 1, "depth", params, false, false)
            .await
    }

    /// Recent public trades
    ///
    /// GET /v1/trades?symbol={symbol}&limit={limit}
    pub async fn recent_trades(&self, symbol: &str, limit: Option<u32>) -> Result<Vec<Trade>> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        params.push_opt("limit", limit);
        self.send_request(Method::GET, 1, "trades", params, false, false)
            .await
    }

    /// Kline/candlestick history
    ///
    /// GET /v1/klines?symbol={symbol}&interval={interval}&...
    pub async fn klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        limit: Option<u32>,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<Vec<Kline>> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        params.push("interval", interval.as_str());
        params.push_opt("limit", limit);
        params.push_opt("startTime", start_time);
        params.push_opt("endTime", end_time);
        self.send_request(Method::GET, 1, "klines", params, false, false)
            .await
    }

    /// 24 hour rolling window statistics
    ///
    /// GET /v1/ticker/24hr?symbol={symbol}
    pub async fn ticker_24h(&self, symbol: &str) -> Result<Ticker24h> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        self.send_request(Method::GET, 1, "ticker/24hr", params, false, false)
            .await
    }

    /// Latest price for a symbol
    ///
    /// GET /v3/ticker/price?symbol={symbol}
    pub async fn price(&self, symbol: &str) -> Result<SymbolPrice> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        self.send_request(Method::GET, 3, "ticker/price", params, false, false)
            .await
    }

    /// Best bid/ask for a symbol
    ///
    /// GET /v3/ticker/bookTicker?symbol={symbol}
    pub async fn book_ticker(&self, symbol: &str) -> Result<BookTicker> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        self.send_request(Method::GET, 3, "ticker/bookTicker", params, false, false)
            .await
    }
}
