/*
[INPUT]:  Signed account queries and listen key operations
[OUTPUT]: Account state, trade history, user-data stream listen keys
[POS]:    HTTP layer - account endpoints and user stream session keys
[UPDATE]: When adding new account endpoints or changing query parameters
*/

use reqwest::Method;

use crate::http::client::QueryParams;
use crate::http::{BinanceClient, Result};
use crate::types::{AccountInfo, Empty, ListenKey, MyTrade};

impl BinanceClient {
    /// Account balances and permissions
    ///
    /// GET /v3/account (signed)
    pub async fn account_info(&self) -> Result<AccountInfo> {
        self.send_request(Method::GET, 3, "account", QueryParams::new(), true, true)
            .await
    }

    /// Trades executed for the account on a symbol
    ///
    /// GET /v3/myTrades (signed)
    pub async fn my_trades(
        &self,
        symbol: &str,
        from_trade_id: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<MyTrade>> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        params.push_opt("fromId", from_trade_id);
        params.push_opt("limit", limit);
        self.send_request(Method::GET, 3, "myTrades", params, true, true)
            .await
    }

    /// Open a user-data stream session and obtain its listen key
    ///
    /// POST /v1/userDataStream (API key header, no signature)
    pub async fn start_user_stream(&self) -> Result<ListenKey> {
        self.send_request(
            Method::POST,
            1,
            "userDataStream",
            QueryParams::new(),
            false,
            true,
        )
        .await
    }

    /// Keep a user-data stream session alive; call at least every 30 minutes
    ///
    /// PUT /v1/userDataStream?listenKey={key} (API key header, no signature)
    pub async fn keepalive_user_stream(&self, listen_key: &str) -> Result<()> {
        let mut params = QueryParams::new();
        params.push("listenKey", listen_key);
        let _: Empty = self
            .send_request(Method::PUT, 1, "userDataStream", params, false, true)
            .await?;
        Ok(())
    }

    /// Close a user-data stream session
    ///
    /// DELETE /v1/userDataStream?listenKey={key} (API key header, no signature)
    pub async fn close_user_stream(&self, listen_key: &str) -> Result<()> {
        let mut params = QueryParams::new();
        params.push("listenKey", listen_key);
        let _: Empty = self
            .send_request(Method::DELETE, 1, "userDataStream", params, false, true)
            .await?;
        Ok(())
    }
}
