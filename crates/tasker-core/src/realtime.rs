//! Realtime Channel
//!
//! Phoenix-channel codec for the platform's realtime service plus a
//! [`ChangeFeed`] built on top of any socket transport. The transport owns
//! the connection and the heartbeat timer; this module decides what goes
//! over the wire.
//!
//! Wire format (protocol 1.0.0), one JSON object per frame:
//! `{"topic": "...", "event": "...", "payload": {...}, "ref": "1"}`

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::domain::{DomainError, DomainResult, Todo, TodoId, UserId};
use crate::repository::{AuthProvider, ChangeEvent, ChangeFeed, ChangeFilter, ChangeKind, ChangeSink};
use crate::subscription::Subscription;

/// How often the transport should send a heartbeat frame.
pub const HEARTBEAT_INTERVAL_MS: u32 = 25_000;

const PROTOCOL_VERSION: &str = "1.0.0";
const PHOENIX_TOPIC: &str = "phoenix";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

/// A decoded server frame
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Change(ChangeEvent),
    Reply { reference: Option<String>, ok: bool, detail: String },
    ChannelError(String),
    ChannelClosed,
    /// Frames this client does not act on (presence, system notices, ...)
    Ignored(String),
}

/// Builds and parses the frames of one channel
#[derive(Debug)]
pub struct ChannelCodec {
    topic: String,
    table: String,
    next_ref: Cell<u64>,
}

impl ChannelCodec {
    pub fn new(table: &str, owner: &UserId) -> Self {
        Self { topic: format!("realtime:{}-{}", table, owner), table: table.to_string(), next_ref: Cell::new(1) }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn next_ref(&self) -> String {
        let r = self.next_ref.get();
        self.next_ref.set(r + 1);
        r.to_string()
    }

    fn encode(&self, topic: &str, event: &str, payload: Value) -> String {
        let frame = Frame {
            topic: topic.to_string(),
            event: event.to_string(),
            payload,
            reference: Some(self.next_ref()),
        };
        // A Frame of strings and a Value always serializes.
        serde_json::to_string(&frame).unwrap_or_default()
    }

    /// Join the channel with a row filter on `owner`.
    pub fn join_frame(&self, owner: &UserId, access_token: &str) -> String {
        let payload = json!({
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{
                    "event": "*",
                    "schema": "public",
                    "table": self.table,
                    "filter": format!("user_id=eq.{}", owner),
                }],
            },
            "access_token": access_token,
        });
        self.encode(&self.topic, "phx_join", payload)
    }

    pub fn heartbeat_frame(&self) -> String {
        self.encode(PHOENIX_TOPIC, "heartbeat", json!({}))
    }

    pub fn leave_frame(&self) -> String {
        self.encode(&self.topic, "phx_leave", json!({}))
    }

    pub fn decode(&self, text: &str) -> DomainResult<Incoming> {
        let frame: Frame = serde_json::from_str(text)
            .map_err(|e| DomainError::Transport(format!("malformed realtime frame: {}", e)))?;

        match frame.event.as_str() {
            "phx_reply" => {
                let ok = frame.payload.get("status").and_then(Value::as_str) == Some("ok");
                let detail = frame.payload.get("response").map(Value::to_string).unwrap_or_default();
                Ok(Incoming::Reply { reference: frame.reference, ok, detail })
            }
            _ if frame.topic != self.topic => Ok(Incoming::Ignored(format!("{} on {}", frame.event, frame.topic))),
            "postgres_changes" => decode_change(&frame.payload).map(Incoming::Change),
            "phx_error" => Ok(Incoming::ChannelError(frame.payload.to_string())),
            "phx_close" => Ok(Incoming::ChannelClosed),
            other => Ok(Incoming::Ignored(other.to_string())),
        }
    }
}

#[derive(Deserialize)]
struct ChangeData {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    record: Option<Value>,
    #[serde(default)]
    old_record: Option<Value>,
}

#[derive(Deserialize)]
struct KeyOnly {
    id: TodoId,
}

fn decode_change(payload: &Value) -> DomainResult<ChangeEvent> {
    let data = payload
        .get("data")
        .cloned()
        .ok_or_else(|| DomainError::Transport("change frame without data".to_string()))?;
    let data: ChangeData =
        serde_json::from_value(data).map_err(|e| DomainError::Transport(format!("bad change payload: {}", e)))?;

    let kind = match data.kind.as_str() {
        "INSERT" => ChangeKind::Insert,
        "UPDATE" => ChangeKind::Update,
        "DELETE" => ChangeKind::Delete,
        other => return Err(DomainError::Transport(format!("unknown change type {}", other))),
    };

    let new = match data.record.filter(|v| v.as_object().is_some_and(|o| !o.is_empty())) {
        Some(record) => Some(
            serde_json::from_value::<Todo>(record)
                .map_err(|e| DomainError::Transport(format!("bad record in change: {}", e)))?,
        ),
        None => None,
    };
    let old_id = data
        .old_record
        .and_then(|old| serde_json::from_value::<KeyOnly>(old).ok())
        .map(|k| k.id)
        .or_else(|| new.as_ref().map(|t| t.id.clone()));

    Ok(ChangeEvent { kind, new, old_id })
}

/// `wss://<host>/realtime/v1/websocket?apikey=<key>&vsn=1.0.0`
pub fn socket_url(backend: &Url, anon_key: &str) -> DomainResult<Url> {
    let mut url = backend
        .join("realtime/v1/websocket")
        .map_err(|e| DomainError::Config(format!("invalid realtime URL: {}", e)))?;
    let scheme = if url.scheme() == "http" { "ws" } else { "wss" };
    url.set_scheme(scheme)
        .map_err(|_| DomainError::Config(format!("cannot use {} for realtime", backend)))?;
    url.query_pairs_mut().append_pair("apikey", anon_key).append_pair("vsn", PROTOCOL_VERSION);
    Ok(url)
}

/// An open socket as seen by the channel
pub trait RealtimeSocket {
    fn send(&self, text: &str) -> DomainResult<()>;
    fn close(&self);
}

/// Callbacks the transport drives
pub trait FrameHandler {
    fn on_open(&self, socket: &dyn RealtimeSocket);
    fn on_frame(&self, text: &str, socket: &dyn RealtimeSocket);
    /// Called every [`HEARTBEAT_INTERVAL_MS`] while the socket is open.
    fn on_heartbeat(&self, socket: &dyn RealtimeSocket);
    fn on_close(&self, reason: &str);
}

/// Opens sockets. Reconnecting after a drop is up to the implementation.
pub trait RealtimeTransport {
    fn connect(&self, url: &Url, handler: Rc<dyn FrameHandler>) -> DomainResult<Box<dyn RealtimeSocket>>;
}

/// One joined channel delivering changes to a sink
struct ChannelHandler {
    codec: Rc<ChannelCodec>,
    owner: UserId,
    access_token: String,
    sink: ChangeSink,
}

impl FrameHandler for ChannelHandler {
    fn on_open(&self, socket: &dyn RealtimeSocket) {
        log::info!("[REALTIME] Socket open, joining {}", self.codec.topic());
        if let Err(e) = socket.send(&self.codec.join_frame(&self.owner, &self.access_token)) {
            log::error!("[REALTIME] Join failed: {}", e);
        }
    }

    fn on_frame(&self, text: &str, _socket: &dyn RealtimeSocket) {
        match self.codec.decode(text) {
            Ok(Incoming::Change(event)) => (self.sink)(event),
            Ok(Incoming::Reply { ok: false, detail, .. }) => log::error!("[REALTIME] Request rejected: {}", detail),
            Ok(Incoming::Reply { .. }) => {}
            Ok(Incoming::ChannelError(detail)) => log::error!("[REALTIME] Channel error: {}", detail),
            Ok(Incoming::ChannelClosed) => log::warn!("[REALTIME] Channel {} closed by server", self.codec.topic()),
            Ok(Incoming::Ignored(what)) => log::debug!("[REALTIME] Ignoring {}", what),
            Err(e) => log::warn!("[REALTIME] {}", e),
        }
    }

    fn on_heartbeat(&self, socket: &dyn RealtimeSocket) {
        if let Err(e) = socket.send(&self.codec.heartbeat_frame()) {
            log::warn!("[REALTIME] Heartbeat failed: {}", e);
        }
    }

    fn on_close(&self, reason: &str) {
        log::warn!("[REALTIME] Socket closed: {}", reason);
    }
}

/// Change feed over the realtime service
pub struct RealtimeFeed<T: RealtimeTransport> {
    transport: T,
    socket_url: Url,
    table: String,
    auth: Rc<dyn AuthProvider>,
}

impl<T: RealtimeTransport> RealtimeFeed<T> {
    pub fn new(transport: T, socket_url: Url, table: impl Into<String>, auth: Rc<dyn AuthProvider>) -> Self {
        Self { transport, socket_url, table: table.into(), auth }
    }
}

#[async_trait(?Send)]
impl<T: RealtimeTransport> ChangeFeed for RealtimeFeed<T> {
    async fn subscribe(&self, filter: ChangeFilter, sink: ChangeSink) -> DomainResult<Subscription> {
        let session = self
            .auth
            .get_session()
            .await?
            .ok_or_else(|| DomainError::Auth("Your session has expired. Please sign in again.".to_string()))?;

        let codec = Rc::new(ChannelCodec::new(&self.table, &filter.owner));
        let handler = Rc::new(ChannelHandler {
            codec: codec.clone(),
            owner: filter.owner,
            access_token: session.access_token,
            sink,
        });
        let socket = self.transport.connect(&self.socket_url, handler)?;

        Ok(Subscription::new(move || {
            log::info!("[REALTIME] Leaving {}", codec.topic());
            if let Err(e) = socket.send(&codec.leave_frame()) {
                log::debug!("[REALTIME] Leave not sent: {}", e);
            }
            socket.close();
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryBackend;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn codec() -> ChannelCodec {
        ChannelCodec::new("todos", &UserId::new("u-1"))
    }

    fn change_frame(data: Value) -> String {
        json!({
            "topic": "realtime:todos-u-1",
            "event": "postgres_changes",
            "payload": { "data": data, "ids": [1] },
            "ref": null,
        })
        .to_string()
    }

    fn row(id: i64, title: &str) -> Value {
        json!({
            "id": id, "user_id": "u-1", "title": title, "description": "", "due": null,
            "priority": "high", "status": null, "cover_image": null,
            "created_at": "2025-03-01T10:00:00+00:00",
        })
    }

    #[test]
    fn test_join_frame_filters_by_owner() {
        let frame: Frame = serde_json::from_str(&codec().join_frame(&UserId::new("u-1"), "jwt")).unwrap();

        assert_eq!(frame.topic, "realtime:todos-u-1");
        assert_eq!(frame.event, "phx_join");
        assert_eq!(frame.reference.as_deref(), Some("1"));
        assert_eq!(frame.payload["config"]["postgres_changes"][0]["filter"], "user_id=eq.u-1");
        assert_eq!(frame.payload["access_token"], "jwt");
    }

    #[test]
    fn test_refs_increase() {
        let codec = codec();
        let a: Frame = serde_json::from_str(&codec.heartbeat_frame()).unwrap();
        let b: Frame = serde_json::from_str(&codec.leave_frame()).unwrap();
        assert_eq!(a.topic, "phoenix");
        assert_eq!((a.reference.as_deref(), b.reference.as_deref()), (Some("1"), Some("2")));
    }

    #[test]
    fn test_decode_insert() {
        let text = change_frame(json!({ "type": "INSERT", "record": row(7, "From B"), "old_record": null }));

        let Incoming::Change(event) = codec().decode(&text).unwrap() else {
            panic!("expected a change");
        };
        assert_eq!(event.kind, ChangeKind::Insert);
        let todo = event.new.unwrap();
        assert_eq!(todo.id, TodoId::new("7"));
        assert_eq!(todo.description, None);
        assert_eq!(todo.status, crate::domain::Status::Todo);
    }

    #[test]
    fn test_decode_delete_uses_old_record_key() {
        let text = change_frame(json!({ "type": "DELETE", "record": {}, "old_record": { "id": 7 } }));
        assert_eq!(
            codec().decode(&text).unwrap(),
            Incoming::Change(ChangeEvent::deleted(TodoId::new("7")))
        );
    }

    #[test]
    fn test_decode_replies_and_foreign_topics() {
        let reply = r#"{"topic":"realtime:todos-u-1","event":"phx_reply","payload":{"status":"error","response":{"reason":"unauthorized"}},"ref":"1"}"#;
        assert!(matches!(codec().decode(reply).unwrap(), Incoming::Reply { ok: false, .. }));

        let foreign = r#"{"topic":"realtime:other","event":"postgres_changes","payload":{},"ref":null}"#;
        assert!(matches!(codec().decode(foreign).unwrap(), Incoming::Ignored(_)));

        assert!(codec().decode("not json").is_err());
    }

    #[test]
    fn test_socket_url() {
        let base = Url::parse("https://project.supabase.co/").unwrap();
        assert_eq!(
            socket_url(&base, "anon").unwrap().as_str(),
            "wss://project.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );
        let local = Url::parse("http://localhost:54321/").unwrap();
        assert_eq!(socket_url(&local, "k").unwrap().scheme(), "ws");
    }

    /// Socket recording every frame sent through it
    #[derive(Clone, Default)]
    struct RecordingSocket {
        sent: Rc<RefCell<Vec<String>>>,
        closed: Rc<Cell<bool>>,
    }

    impl RealtimeSocket for RecordingSocket {
        fn send(&self, text: &str) -> DomainResult<()> {
            if self.closed.get() {
                return Err(DomainError::Transport("closed".into()));
            }
            self.sent.borrow_mut().push(text.to_string());
            Ok(())
        }

        fn close(&self) {
            self.closed.set(true);
        }
    }

    #[derive(Default)]
    struct MockTransport {
        socket: RecordingSocket,
        handler: RefCell<Option<Rc<dyn FrameHandler>>>,
    }

    impl RealtimeTransport for &MockTransport {
        fn connect(&self, _url: &Url, handler: Rc<dyn FrameHandler>) -> DomainResult<Box<dyn RealtimeSocket>> {
            *self.handler.borrow_mut() = Some(handler);
            Ok(Box::new(self.socket.clone()))
        }
    }

    impl MockTransport {
        fn handler(&self) -> Rc<dyn FrameHandler> {
            self.handler.borrow().clone().expect("connected")
        }

        fn sent_events(&self) -> Vec<String> {
            self.socket
                .sent
                .borrow()
                .iter()
                .map(|t| serde_json::from_str::<Frame>(t).unwrap().event)
                .collect()
        }
    }

    #[tokio::test]
    async fn test_feed_lifecycle() {
        let backend = MemoryBackend::new();
        let owner = backend.register("a@b.co", "password1");
        let client = backend.client();
        client.sign_in_with_password("a@b.co", "password1").await.unwrap();

        let transport = MockTransport::default();
        let feed = RealtimeFeed::new(
            &transport,
            Url::parse("wss://project.supabase.co/realtime/v1/websocket").unwrap(),
            "todos",
            Rc::new(client),
        );

        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let sub = feed
            .subscribe(ChangeFilter { owner: owner.clone() }, Rc::new(move |e| sink.borrow_mut().push(e)))
            .await
            .unwrap();

        let handler = transport.handler();
        handler.on_open(&transport.socket);
        handler.on_heartbeat(&transport.socket);

        let topic = format!("realtime:todos-{}", owner);
        let mut record = row(3, "Pushed");
        record["user_id"] = json!(owner.as_str());
        let frame = json!({
            "topic": topic, "event": "postgres_changes",
            "payload": { "data": { "type": "UPDATE", "record": record, "old_record": { "id": 3 } } },
            "ref": null,
        });
        handler.on_frame(&frame.to_string(), &transport.socket);
        handler.on_frame("garbage", &transport.socket);

        assert_eq!(received.borrow().len(), 1);
        assert_eq!(received.borrow()[0].kind, ChangeKind::Update);

        drop(sub);
        assert_eq!(transport.sent_events(), vec!["phx_join", "heartbeat", "phx_leave"]);
        assert!(transport.socket.closed.get());
    }

    #[tokio::test]
    async fn test_subscribe_requires_session() {
        let backend = MemoryBackend::new();
        let transport = MockTransport::default();
        let feed = RealtimeFeed::new(
            &transport,
            Url::parse("wss://project.supabase.co/realtime/v1/websocket").unwrap(),
            "todos",
            Rc::new(backend.client()),
        );

        let err = feed
            .subscribe(ChangeFilter { owner: UserId::new("u-1") }, Rc::new(|_| {}))
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert!(transport.handler.borrow().is_none());
    }
}
