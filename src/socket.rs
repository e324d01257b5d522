//! Shared Push Channel
//!
//! One WebSocket per tenant, shared by every subscriber through
//! reference-counted handles. The first handle opens the connection, the
//! last release closes it. A handle registers named event handlers and
//! deregisters exactly its own on release, so independent components share
//! a connection without sharing teardown.
//!
//! Frames are JSON text in both directions: `{"event": <name>, "data": ..}`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use gloo_net::websocket::futures::WebSocket;
use gloo_net::websocket::Message;
use leptos::task::spawn_local;
use send_wrapper::SendWrapper;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

pub type Handler = Rc<dyn Fn(&Value)>;

/// Named event handlers, each owned by the subscriber that registered it
#[derive(Default)]
pub struct Registry {
    next_id: u64,
    handlers: HashMap<String, Vec<(u64, Handler)>>,
}

impl Registry {
    /// Register a handler; the returned id deregisters exactly this one
    pub fn add(&mut self, event: &str, handler: Handler) -> u64 {
        self.next_id += 1;
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push((self.next_id, handler));
        self.next_id
    }

    pub fn remove(&mut self, ids: &[u64]) {
        for handlers in self.handlers.values_mut() {
            handlers.retain(|(id, _)| !ids.contains(id));
        }
        self.handlers.retain(|_, handlers| !handlers.is_empty());
    }

    /// Clones of the handlers for `event`, so callers invoke them without
    /// holding a borrow (a handler may register or release during the
    /// call).
    pub fn matching(&self, event: &str) -> Vec<Handler> {
        self.handlers
            .get(event)
            .map(|handlers| handlers.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}

struct Channel {
    company_id: u32,
    subscribers: Cell<usize>,
    registry: RefCell<Registry>,
    outbound: RefCell<Option<mpsc::UnboundedSender<String>>>,
    alive: Rc<Cell<bool>>,
}

/// Tenant-keyed connection pool, provided once through context at the
/// composition root. Context storage is thread-safe while the channel map
/// is not, so the map rides in a single-thread `SendWrapper`.
#[derive(Clone)]
pub struct SocketManager {
    channels: SendWrapper<Rc<RefCell<HashMap<u32, Rc<Channel>>>>>,
}

impl SocketManager {
    pub fn new() -> Self {
        Self {
            channels: SendWrapper::new(Rc::default()),
        }
    }

    /// Obtain a handle on the tenant's channel, opening the connection if
    /// this is the first subscriber.
    pub fn subscribe(&self, company_id: u32) -> ChannelHandle {
        self.attach(company_id, || open_channel(company_id))
    }

    fn attach(&self, company_id: u32, open: impl FnOnce() -> Rc<Channel>) -> ChannelHandle {
        let channel = {
            let mut channels = self.channels.borrow_mut();
            Rc::clone(channels.entry(company_id).or_insert_with(open))
        };
        channel.subscribers.set(channel.subscribers.get() + 1);
        ChannelHandle {
            manager: self.clone(),
            channel,
            handler_ids: RefCell::new(Vec::new()),
            released: Cell::new(false),
        }
    }

    fn release(&self, channel: &Rc<Channel>, handler_ids: &[u64]) {
        channel.registry.borrow_mut().remove(handler_ids);
        let left = channel.subscribers.get().saturating_sub(1);
        channel.subscribers.set(left);
        if left == 0 {
            channel.alive.set(false);
            // Dropping the sender ends the writer task, which sends the
            // close frame on its way out.
            channel.outbound.borrow_mut().take();
            self.channels.borrow_mut().remove(&channel.company_id);
        }
    }
}

impl Default for SocketManager {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's reference to a tenant channel. Dropping the handle
/// releases it; components keep it alive by moving it into `on_cleanup`.
pub struct ChannelHandle {
    manager: SocketManager,
    channel: Rc<Channel>,
    handler_ids: RefCell<Vec<u64>>,
    released: Cell<bool>,
}

impl ChannelHandle {
    /// Register a named event handler owned by this handle
    pub fn on(&self, event: &str, handler: impl Fn(&Value) + 'static) {
        let id = self
            .channel
            .registry
            .borrow_mut()
            .add(event, Rc::new(handler));
        self.handler_ids.borrow_mut().push(id);
    }

    /// Queue an outbound frame; dropped silently once the channel closed
    pub fn emit(&self, event: &str, data: Value) {
        let frame = Envelope {
            event: event.to_string(),
            data,
        };
        match serde_json::to_string(&frame) {
            Ok(text) => {
                if let Some(tx) = self.channel.outbound.borrow().as_ref() {
                    let _ = tx.unbounded_send(text);
                }
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("[socket] emit failed: {}", e).into());
            }
        }
    }

    pub fn release(&self) {
        if !self.released.replace(true) {
            let ids = self.handler_ids.borrow();
            self.manager.release(&self.channel, &ids);
        }
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.release();
    }
}

fn channel_url(company_id: u32) -> String {
    match web_sys::window() {
        Some(win) => {
            let location = win.location();
            let scheme = match location.protocol().as_deref() {
                Ok("https:") => "wss",
                _ => "ws",
            };
            let host = location.host().unwrap_or_else(|_| "localhost".into());
            format!("{}://{}/socket/{}", scheme, host, company_id)
        }
        None => format!("ws://localhost/socket/{}", company_id),
    }
}

fn open_channel(company_id: u32) -> Rc<Channel> {
    let (tx, rx) = mpsc::unbounded();
    let channel = Rc::new(Channel {
        company_id,
        subscribers: Cell::new(0),
        registry: RefCell::new(Registry::default()),
        outbound: RefCell::new(Some(tx)),
        alive: Rc::new(Cell::new(true)),
    });
    spawn_local(run_channel(
        channel_url(company_id),
        rx,
        Rc::clone(&channel),
    ));
    channel
}

async fn run_channel(
    url: String,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    channel: Rc<Channel>,
) {
    let ws = match WebSocket::open(&url) {
        Ok(ws) => ws,
        Err(e) => {
            web_sys::console::warn_1(&format!("[socket] open failed: {:?}", e).into());
            return;
        }
    };
    let (mut sink, mut stream) = ws.split();

    spawn_local(async move {
        while let Some(frame) = outbound_rx.next().await {
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        if !channel.alive.get() {
            break;
        }
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Bytes(_)) => continue,
            Err(_) => break,
        };
        match serde_json::from_str::<Envelope>(&text) {
            Ok(envelope) => {
                let handlers = channel.registry.borrow().matching(&envelope.event);
                for handler in handlers {
                    handler(&envelope.data);
                }
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("[socket] bad frame: {}", e).into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_dispatches_by_event_name() {
        let mut registry = Registry::default();
        let hits = Rc::new(Cell::new(0u32));

        let seen = Rc::clone(&hits);
        registry.add("ticket", Rc::new(move |_| seen.set(seen.get() + 1)));

        for handler in registry.matching("ticket") {
            handler(&json!({}));
        }
        for handler in registry.matching("chat") {
            handler(&json!({}));
        }
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_remove_drops_only_the_named_ids() {
        let mut registry = Registry::default();
        let first = Rc::new(Cell::new(0u32));
        let second = Rc::new(Cell::new(0u32));

        let seen = Rc::clone(&first);
        let a = registry.add("ticket", Rc::new(move |_| seen.set(seen.get() + 1)));
        let seen = Rc::clone(&second);
        let _b = registry.add("ticket", Rc::new(move |_| seen.set(seen.get() + 1)));
        assert_eq!(registry.handler_count(), 2);

        registry.remove(&[a]);
        assert_eq!(registry.handler_count(), 1);
        for handler in registry.matching("ticket") {
            handler(&json!({}));
        }
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_remove_prunes_empty_event_lists() {
        let mut registry = Registry::default();
        let id = registry.add("auth", Rc::new(|_| {}));
        registry.remove(&[id]);
        assert_eq!(registry.handler_count(), 0);
        assert!(registry.matching("auth").is_empty());
    }

    #[test]
    fn test_handlers_receive_the_payload() {
        let mut registry = Registry::default();
        let got = Rc::new(RefCell::new(Value::Null));

        let seen = Rc::clone(&got);
        registry.add("chat", Rc::new(move |data| *seen.borrow_mut() = data.clone()));

        for handler in registry.matching("chat") {
            handler(&json!({"action": "update"}));
        }
        assert_eq!(*got.borrow(), json!({"action": "update"}));
    }

    #[test]
    fn test_envelope_tolerates_missing_data() {
        let envelope: Envelope = serde_json::from_str(r#"{"event":"userStatus"}"#).unwrap();
        assert_eq!(envelope.event, "userStatus");
        assert_eq!(envelope.data, Value::Null);
    }

    /// A channel that never opened a connection, for exercising the
    /// subscriber accounting off the network.
    fn offline_channel(company_id: u32) -> Rc<Channel> {
        Rc::new(Channel {
            company_id,
            subscribers: Cell::new(0),
            registry: RefCell::new(Registry::default()),
            outbound: RefCell::new(None),
            alive: Rc::new(Cell::new(true)),
        })
    }

    #[test]
    fn test_handles_share_one_channel_per_tenant() {
        let manager = SocketManager::new();
        let first = manager.attach(7, || offline_channel(7));
        let second = manager.attach(7, || offline_channel(7));

        assert!(Rc::ptr_eq(&first.channel, &second.channel));
        assert_eq!(first.channel.subscribers.get(), 2);
    }

    #[test]
    fn test_release_deregisters_only_own_handlers() {
        let manager = SocketManager::new();
        let first = manager.attach(7, || offline_channel(7));
        let second = manager.attach(7, || offline_channel(7));
        first.on("ticket", |_| {});
        second.on("ticket", |_| {});
        assert_eq!(first.channel.registry.borrow().handler_count(), 2);

        first.release();
        assert_eq!(second.channel.registry.borrow().handler_count(), 1);
        assert!(second.channel.alive.get());
    }

    #[test]
    fn test_last_release_closes_the_channel() {
        let manager = SocketManager::new();
        let alive = {
            let handle = manager.attach(7, || offline_channel(7));
            Rc::clone(&handle.channel.alive)
        };
        assert!(!alive.get());
        assert!(manager.channels.borrow().is_empty());
    }

    #[test]
    fn test_release_twice_counts_once() {
        let manager = SocketManager::new();
        let first = manager.attach(7, || offline_channel(7));
        let second = manager.attach(7, || offline_channel(7));

        first.release();
        first.release();
        drop(first);
        assert_eq!(second.channel.subscribers.get(), 1);
        assert!(second.channel.alive.get());
    }
}
