/*
[INPUT]:  Order requests with signed query parameters
[OUTPUT]: Order acknowledgements and order state
[POS]:    HTTP layer - trading endpoints (require signature)
[UPDATE]: When adding new trading endpoints or changing order flow
*/

use reqwest::Method;
use uuid::Uuid;

use crate::http::client::QueryParams;
use crate::http::error::BinanceError;
use crate::http::{BinanceClient, Result};
use crate::types::{CanceledOrder, Empty, NewOrder, OrderAck, OrderDetails};

impl BinanceClient {
    /// Place a new order
    ///
    /// POST /v3/order (signed)
    ///
    /// A client order id is generated when the request does not carry one.
    pub async fn place_order(&self, order: NewOrder) -> Result<OrderAck> {
        let params = Self::order_params(&order);
        self.send_request(Method::POST, 3, "order", params, true, true)
            .await
    }

    /// Validate an order against the matching engine without placing it
    ///
    /// POST /v3/order/test (signed)
    pub async fn place_test_order(&self, order: NewOrder) -> Result<()> {
        let params = Self::order_params(&order);
        let _: Empty = self
            .send_request(Method::POST, 3, "order/test", params, true, true)
            .await?;
        Ok(())
    }

    /// Query a single order's state
    ///
    /// GET /v3/order (signed)
    ///
    /// One of `order_id` or `orig_client_order_id` is required.
    pub async fn query_order(
        &self,
        symbol: &str,
        order_id: Option<i64>,
        orig_client_order_id: Option<&str>,
    ) -> Result<OrderDetails> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        Self::push_order_identity(&mut params, order_id, orig_client_order_id)?;
        self.send_request(Method::GET, 3, "order", params, true, true)
            .await
    }

    /// Cancel an active order
    ///
    /// DELETE /v3/order (signed)
    ///
    /// One of `order_id` or `orig_client_order_id` is required;
    /// `new_client_order_id` names the cancel operation itself.
    pub async fn cancel_order(
        &self,
        symbol: &str,
        order_id: Option<i64>,
        orig_client_order_id: Option<&str>,
        new_client_order_id: Option<&str>,
    ) -> Result<CanceledOrder> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        Self::push_order_identity(&mut params, order_id, orig_client_order_id)?;
        params.push_opt("newClientOrderId", new_client_order_id);
        self.send_request(Method::DELETE, 3, "order", params, true, true)
            .await
    }

    /// All open orders, optionally scoped to a symbol
    ///
    /// GET /v3/openOrders (signed)
    pub async fn open_orders(&self, symbol: Option<&str>) -> Result<Vec<OrderDetails>> {
        let mut params = QueryParams::new();
        params.push_opt("symbol", symbol);
        self.send_request(Method::GET, 3, "openOrders", params, true, true)
            .await
    }

    /// Order history for a symbol
    ///
    /// GET /v3/allOrders (signed)
    pub async fn all_orders(
        &self,
        symbol: &str,
        from_order_id: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<OrderDetails>> {
        let mut params = QueryParams::new();
        params.push("symbol", symbol);
        params.push_opt("orderId", from_order_id);
        params.push_opt("limit", limit);
        self.send_request(Method::GET, 3, "allOrders", params, true, true)
            .await
    }

    fn order_params(order: &NewOrder) -> QueryParams {
        let mut params = QueryParams::new();
        params.push("symbol", &order.symbol);
        params.push("side", order.side.as_str());
        params.push("type", order.order_type.as_str());
        params.push("quantity", order.quantity);
        params.push_opt("price", order.price);
        params.push_opt("timeInForce", order.time_in_force.map(|t| t.as_str()));
        let client_order_id = order
            .new_client_order_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        params.push("newClientOrderId", client_order_id);
        params.push_opt("stopPrice", order.stop_price);
        params.push_opt("icebergQty", order.iceberg_qty);
        params
    }

    fn push_order_identity(
        params: &mut QueryParams,
        order_id: Option<i64>,
        orig_client_order_id: Option<&str>,
    ) -> Result<()> {
        if order_id.is_none() && orig_client_order_id.is_none() {
            return Err(BinanceError::InvalidArgument(
                "either order_id or orig_client_order_id is required".to_string(),
            ));
        }
        params.push_opt("orderId", order_id);
        params.push_opt("origClientOrderId", orig_client_order_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::http::signature::Credential;
    use crate::http::{BinanceClient, BinanceError, ClientConfig};
    use crate::types::{NewOrder, OrderSide};

    fn authed_client(server: &MockServer) -> BinanceClient {
        let mut client = BinanceClient::with_config(ClientConfig {
            rest_base_url: server.uri(),
            // Keep signed-call tests independent of the time endpoint.
            auto_timestamp: false,
            ..ClientConfig::default()
        })
        .expect("client init");
        client.set_credentials(Credential::new("test-key", "test-secret"));
        client
    }

    #[tokio::test]
    async fn test_place_order_sends_signed_query() {
        let server = MockServer::start().await;
        let ack = r#"{
            "symbol": "BTCUSDT",
            "orderId": 28,
            "clientOrderId": "my-order-1",
            "transactTime": 1507725176595
        }"#;

        Mock::given(method("POST"))
            .and(path("/v3/order"))
            .and(query_param("symbol", "BTCUSDT"))
            .and(query_param("side", "BUY"))
            .and(query_param("type", "LIMIT"))
            .and(query_param("newClientOrderId", "my-order-1"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ack, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let order = NewOrder::limit(
            "BTCUSDT",
            OrderSide::Buy,
            "0.5".parse().unwrap(),
            "30000".parse().unwrap(),
        )
        .with_client_order_id("my-order-1");

        let ack = client.place_order(order).await.expect("place_order failed");
        assert_eq!(ack.order_id, 28);
        assert_eq!(ack.client_order_id, "my-order-1");
    }

    #[tokio::test]
    async fn test_place_order_without_credentials_makes_no_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/order"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = BinanceClient::with_config(ClientConfig {
            rest_base_url: server.uri(),
            ..ClientConfig::default()
        })
        .expect("client init");

        let order = NewOrder::market("BTCUSDT", OrderSide::Buy, "1".parse().unwrap());
        let err = client.place_order(order).await.unwrap_err();
        assert!(matches!(err, BinanceError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_query_order_requires_an_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/order"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let err = client.query_order("BTCUSDT", None, None).await.unwrap_err();
        assert!(matches!(err, BinanceError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_cancel_order_sends_new_client_order_id() {
        let server = MockServer::start().await;
        let body = r#"{
            "symbol": "BTCUSDT",
            "orderId": 28,
            "origClientOrderId": "original-id",
            "clientOrderId": "cancel-id"
        }"#;

        Mock::given(method("DELETE"))
            .and(path("/v3/order"))
            .and(query_param("origClientOrderId", "original-id"))
            .and(query_param("newClientOrderId", "cancel-id"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let canceled = client
            .cancel_order("BTCUSDT", None, Some("original-id"), Some("cancel-id"))
            .await
            .expect("cancel_order failed");

        assert_eq!(canceled.orig_client_order_id, "original-id");
        assert_eq!(canceled.client_order_id, "cancel-id");
    }

    #[tokio::test]
    async fn test_rejected_order_surfaces_exchange_code() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/order"))
            .respond_with(ResponseTemplate::new(400).set_body_raw(
                r#"{"code":-2010,"msg":"Account has insufficient balance for requested action."}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let order = NewOrder::market("BTCUSDT", OrderSide::Buy, "10000".parse().unwrap());
        let err = client.place_order(order).await.unwrap_err();

        match err {
            BinanceError::Rejected { code, message } => {
                assert_eq!(code, -2010);
                assert!(message.contains("insufficient balance"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }
}
