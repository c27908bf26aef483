/*
[INPUT]:  Stream URLs, listen keys and per-topic handlers
[OUTPUT]: Live socket registry with routed inbound events
[POS]:    WebSocket layer - socket lifecycle and subscription registry
[UPDATE]: When adding new stream kinds or changing teardown semantics
*/

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use crate::http::error::{BinanceError, Result};
use crate::types::KlineInterval;
use crate::ws::message::{
    AccountUpdateEvent, AggTradeEvent, DepthEvent, KlineEvent, OrderUpdateEvent, TradeEvent,
    EVENT_ACCOUNT_INFO, EVENT_ACCOUNT_POSITION, EVENT_EXECUTION_REPORT,
};

const STREAM_BASE_URL: &str = "wss://stream.binance.com:9443/ws";
const PARSE_FAIL_LOG_LIMIT: usize = 3;
const UNKNOWN_EVENT_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

static PARSE_FAIL_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);
static UNKNOWN_EVENT_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Role of a registered socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    /// One market-data topic per socket
    Topic,
    /// The single listen-key gated account/order stream
    UserData,
}

struct SocketEntry {
    id: u64,
    role: StreamRole,
    close_tx: mpsc::Sender<()>,
}

/// Live sockets plus the handle-id counter.
///
/// The two locks stay separate: id allocation must not contend with registry
/// scans, and neither lock is ever held across a connect, send, or handler
/// invocation.
#[derive(Default)]
struct StreamRegistry {
    sockets: Mutex<Vec<SocketEntry>>,
    next_id: Mutex<u64>,
}

impl StreamRegistry {
    /// Next handle id. Strictly monotonic for the life of the process; ids
    /// are consumed even when the subsequent connect fails and are never
    /// reused.
    fn allocate_id(&self) -> u64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    fn insert(&self, entry: SocketEntry) {
        self.sockets.lock().unwrap().push(entry);
    }

    /// Take the entry out of the registry. Returns `None` when another close
    /// path already removed it, making concurrent close notifications no-ops.
    fn remove(&self, id: u64) -> Option<SocketEntry> {
        let mut sockets = self.sockets.lock().unwrap();
        let index = sockets.iter().position(|entry| entry.id == id)?;
        Some(sockets.swap_remove(index))
    }

    fn take_all(&self) -> Vec<SocketEntry> {
        std::mem::take(&mut *self.sockets.lock().unwrap())
    }

    fn take_by_role(&self, role: StreamRole) -> Vec<SocketEntry> {
        let mut sockets = self.sockets.lock().unwrap();
        let mut taken = Vec::new();
        let mut index = 0;
        while index < sockets.len() {
            if sockets[index].role == role {
                taken.push(sockets.swap_remove(index));
            } else {
                index += 1;
            }
        }
        taken
    }

    fn id_for_role(&self, role: StreamRole) -> Option<u64> {
        self.sockets
            .lock()
            .unwrap()
            .iter()
            .find(|entry| entry.role == role)
            .map(|entry| entry.id)
    }

    fn ids(&self) -> Vec<u64> {
        self.sockets.lock().unwrap().iter().map(|e| e.id).collect()
    }

    fn len(&self) -> usize {
        self.sockets.lock().unwrap().len()
    }
}

type AccountHandler = Arc<dyn Fn(AccountUpdateEvent) + Send + Sync>;
type OrderHandler = Arc<dyn Fn(OrderUpdateEvent) + Send + Sync>;

#[derive(Default)]
struct UserHandlers {
    account: Option<AccountHandler>,
    order: Option<OrderHandler>,
}

type Dispatch = Box<dyn Fn(&str) + Send>;

/// WebSocket subscription manager.
///
/// Each subscription opens one socket with its own read/write task; inbound
/// messages are dispatched on that task, so ordering holds per socket while
/// different sockets deliver in parallel. Sockets never reconnect: a closed
/// handle is gone and the caller subscribes again.
pub struct BinanceWebSocket {
    stream_base_url: String,
    registry: Arc<StreamRegistry>,
    user_handlers: Arc<Mutex<UserHandlers>>,
}

impl BinanceWebSocket {
    /// Create a manager pointing at the production stream endpoint
    pub fn new() -> Self {
        Self::with_base_url(STREAM_BASE_URL)
    }

    /// Create a manager with a custom stream base URL
    pub fn with_base_url(stream_base_url: impl Into<String>) -> Self {
        Self {
            stream_base_url: stream_base_url.into().trim_end_matches('/').to_string(),
            registry: Arc::new(StreamRegistry::default()),
            user_handlers: Arc::new(Mutex::new(UserHandlers::default())),
        }
    }

    /// Number of currently open sockets
    pub fn socket_count(&self) -> usize {
        self.registry.len()
    }

    /// Handle ids of currently open sockets
    pub fn open_socket_ids(&self) -> Vec<u64> {
        self.registry.ids()
    }

    /// Subscribe to a raw stream path; every message parses as `T`
    ///
    /// Connect failure is an `Err` value, not a fault: it is a normal
    /// outcome the caller retries or reports.
    pub async fn subscribe_topic<T, F>(&self, stream_path: &str, handler: F) -> Result<u64>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let dispatch: Dispatch = Box::new(move |text| match serde_json::from_str::<T>(text) {
            Ok(event) => handler(event),
            Err(err) => log_parse_fail_once(&err, text),
        });
        let url = format!("{}/{}", self.stream_base_url, stream_path);
        self.create_socket(&url, StreamRole::Topic, dispatch).await
    }

    /// Subscribe to kline updates (`<symbol>@kline_<interval>`)
    pub async fn subscribe_kline<F>(
        &self,
        symbol: &str,
        interval: KlineInterval,
        handler: F,
    ) -> Result<u64>
    where
        F: Fn(KlineEvent) + Send + Sync + 'static,
    {
        let stream = format!("{}@kline_{}", symbol.to_lowercase(), interval.as_str());
        self.subscribe_topic(&stream, handler).await
    }

    /// Subscribe to diff depth updates (`<symbol>@depth`)
    pub async fn subscribe_depth<F>(&self, symbol: &str, handler: F) -> Result<u64>
    where
        F: Fn(DepthEvent) + Send + Sync + 'static,
    {
        let stream = format!("{}@depth", symbol.to_lowercase());
        self.subscribe_topic(&stream, handler).await
    }

    /// Subscribe to raw trades (`<symbol>@trade`)
    pub async fn subscribe_trades<F>(&self, symbol: &str, handler: F) -> Result<u64>
    where
        F: Fn(TradeEvent) + Send + Sync + 'static,
    {
        let stream = format!("{}@trade", symbol.to_lowercase());
        self.subscribe_topic(&stream, handler).await
    }

    /// Subscribe to aggregated trades (`<symbol>@aggTrade`)
    pub async fn subscribe_agg_trades<F>(&self, symbol: &str, handler: F) -> Result<u64>
    where
        F: Fn(AggTradeEvent) + Send + Sync + 'static,
    {
        let stream = format!("{}@aggTrade", symbol.to_lowercase());
        self.subscribe_topic(&stream, handler).await
    }

    /// Register the account-update handler on the user-data stream.
    ///
    /// Reuses an already open user-data socket; only one transport exists
    /// per manager regardless of how many handlers are registered.
    pub async fn subscribe_user_account<F>(&self, listen_key: &str, handler: F) -> Result<u64>
    where
        F: Fn(AccountUpdateEvent) + Send + Sync + 'static,
    {
        self.user_handlers.lock().unwrap().account = Some(Arc::new(handler));
        self.ensure_user_socket(listen_key).await
    }

    /// Register the order-update handler on the user-data stream.
    pub async fn subscribe_user_orders<F>(&self, listen_key: &str, handler: F) -> Result<u64>
    where
        F: Fn(OrderUpdateEvent) + Send + Sync + 'static,
    {
        self.user_handlers.lock().unwrap().order = Some(Arc::new(handler));
        self.ensure_user_socket(listen_key).await
    }

    /// Drop the account-update handler; closes the user-data socket once no
    /// handler remains registered.
    pub async fn unsubscribe_user_account(&self) {
        let both_empty = {
            let mut handlers = self.user_handlers.lock().unwrap();
            handlers.account = None;
            handlers.order.is_none()
        };
        if both_empty {
            self.close_entries(self.registry.take_by_role(StreamRole::UserData))
                .await;
        }
    }

    /// Drop the order-update handler; closes the user-data socket once no
    /// handler remains registered.
    pub async fn unsubscribe_user_orders(&self) {
        let both_empty = {
            let mut handlers = self.user_handlers.lock().unwrap();
            handlers.order = None;
            handlers.account.is_none()
        };
        if both_empty {
            self.close_entries(self.registry.take_by_role(StreamRole::UserData))
                .await;
        }
    }

    /// Close the socket with the given handle id; no-op if not found
    pub async fn unsubscribe(&self, id: u64) {
        if let Some(entry) = self.registry.remove(id) {
            let _ = entry.close_tx.send(()).await;
        }
    }

    /// Close every open socket and clear both user-data handlers
    pub async fn unsubscribe_all(&self) {
        {
            let mut handlers = self.user_handlers.lock().unwrap();
            handlers.account = None;
            handlers.order = None;
        }
        self.close_entries(self.registry.take_all()).await;
    }

    async fn ensure_user_socket(&self, listen_key: &str) -> Result<u64> {
        if let Some(id) = self.registry.id_for_role(StreamRole::UserData) {
            debug!(socket_id = id, "reusing open user-data socket");
            return Ok(id);
        }

        let handlers = Arc::clone(&self.user_handlers);
        let dispatch: Dispatch = Box::new(move |text| dispatch_user_event(&handlers, text));
        let url = format!("{}/{}", self.stream_base_url, listen_key);
        self.create_socket(&url, StreamRole::UserData, dispatch)
            .await
    }

    async fn create_socket(&self, url: &str, role: StreamRole, dispatch: Dispatch) -> Result<u64> {
        // The id is allocated before connecting and is consumed even when
        // the connect fails.
        let id = self.registry.allocate_id();

        let (ws_stream, _response) = connect_async(url).await.map_err(|err| {
            warn!(socket_id = id, error = %err, "failed to open socket");
            BinanceError::SocketOpenFailed(err.to_string())
        })?;
        let (mut write, mut read) = ws_stream.split();
        let (close_tx, mut close_rx) = mpsc::channel::<()>(1);

        self.registry.insert(SocketEntry { id, role, close_tx });
        info!(socket_id = id, ?role, "socket open");

        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = close_rx.recv() => {
                        let _ = write.send(WsMessage::Close(None)).await;
                        break;
                    }
                    incoming = read.next() => {
                        match incoming {
                            Some(Ok(WsMessage::Ping(payload))) => {
                                let _ = write.send(WsMessage::Pong(payload)).await;
                            }
                            Some(Ok(WsMessage::Pong(_))) => {}
                            Some(Ok(WsMessage::Close(_))) => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                            Some(Ok(message)) => {
                                if let Some(text) = message_text(message) {
                                    dispatch(&text);
                                }
                            }
                            Some(Err(err)) => {
                                info!(socket_id = id, error = %err, "socket read failed");
                                break;
                            }
                            None => break,
                        }
                    }
                }
            }

            // Single deregistration point for both close directions; a
            // second notification finds nothing to remove.
            registry.remove(id);
            debug!(socket_id = id, "socket closed");
        });

        Ok(id)
    }

    async fn close_entries(&self, entries: Vec<SocketEntry>) {
        for entry in entries {
            let _ = entry.close_tx.send(()).await;
        }
    }
}

impl Default for BinanceWebSocket {
    fn default() -> Self {
        Self::new()
    }
}

/// Route a user-data payload by its `"e"` marker. Unrecognized markers are
/// dropped so new server-side event types do not break existing sessions.
fn dispatch_user_event(handlers: &Mutex<UserHandlers>, text: &str) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            log_parse_fail_once(&err, text);
            return;
        }
    };

    match value.get("e").and_then(|e| e.as_str()) {
        Some(EVENT_ACCOUNT_POSITION) | Some(EVENT_ACCOUNT_INFO) => {
            let handler = handlers.lock().unwrap().account.clone();
            if let Some(handler) = handler {
                match serde_json::from_value::<AccountUpdateEvent>(value) {
                    Ok(event) => handler(event),
                    Err(err) => log_parse_fail_once(&err, text),
                }
            }
        }
        Some(EVENT_EXECUTION_REPORT) => {
            let handler = handlers.lock().unwrap().order.clone();
            if let Some(handler) = handler {
                match serde_json::from_value::<OrderUpdateEvent>(value) {
                    Ok(event) => handler(event),
                    Err(err) => log_parse_fail_once(&err, text),
                }
            }
        }
        other => log_unknown_event_once(other, text),
    }
}

fn message_text(message: WsMessage) -> Option<String> {
    match message {
        WsMessage::Text(text) => Some(text.to_string()),
        WsMessage::Binary(bytes) => String::from_utf8(bytes.to_vec()).ok(),
        _ => None,
    }
}

fn log_parse_fail_once(err: &serde_json::Error, raw: &str) {
    let count = PARSE_FAIL_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < PARSE_FAIL_LOG_LIMIT {
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        info!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            message = %preview,
            "ws message parse failed"
        );
    }
}

fn log_unknown_event_once(event_type: Option<&str>, raw: &str) {
    let count = UNKNOWN_EVENT_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < UNKNOWN_EVENT_LOG_LIMIT {
        debug!(
            sample_index = count + 1,
            sample_limit = UNKNOWN_EVENT_LOG_LIMIT,
            event_type = event_type.unwrap_or("<missing>"),
            bytes = raw.len(),
            "ws user-data event type unrecognized"
        );
    }
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut out = String::with_capacity(max_len + 3);
    out.push_str(&value[..max_len]);
    out.push_str("...");
    out
}
