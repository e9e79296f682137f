//! WebSocket transport for the realtime change feed
//!
//! One socket per subscription. A heartbeat runs while the socket is open;
//! a closed socket is logged and not reopened.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use tasker_core::domain::DomainError;
use tasker_core::realtime::{FrameHandler, RealtimeSocket, RealtimeTransport, HEARTBEAT_INTERVAL_MS};
use tasker_core::DomainResult;
use url::Url;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserTransport;

/// Borrowed view of the socket handed to the frame handler
struct SocketRef(WebSocket);

impl RealtimeSocket for SocketRef {
    fn send(&self, text: &str) -> DomainResult<()> {
        if self.0.ready_state() != WebSocket::OPEN {
            return Err(DomainError::Transport("realtime socket is not open".to_string()));
        }
        self.0
            .send_with_str(text)
            .map_err(|e| DomainError::Transport(format!("realtime send failed: {:?}", e)))
    }

    fn close(&self) {
        if let Err(e) = self.0.close() {
            log::debug!("[REALTIME] close failed: {:?}", e);
        }
    }
}

/// Owns the socket, its callbacks and the heartbeat timer
struct BrowserSocket {
    socket: SocketRef,
    heartbeat: Rc<RefCell<Option<Interval>>>,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl RealtimeSocket for BrowserSocket {
    fn send(&self, text: &str) -> DomainResult<()> {
        self.socket.send(text)
    }

    fn close(&self) {
        self.heartbeat.borrow_mut().take();
        let ws = &self.socket.0;
        ws.set_onopen(None);
        ws.set_onmessage(None);
        ws.set_onclose(None);
        self.socket.close();
    }
}

impl Drop for BrowserSocket {
    fn drop(&mut self) {
        // Callbacks must not fire into freed closures.
        self.close();
    }
}

impl RealtimeTransport for BrowserTransport {
    fn connect(&self, url: &Url, handler: Rc<dyn FrameHandler>) -> DomainResult<Box<dyn RealtimeSocket>> {
        let ws = WebSocket::new(url.as_str())
            .map_err(|e| DomainError::Transport(format!("could not open realtime socket: {:?}", e)))?;
        let heartbeat: Rc<RefCell<Option<Interval>>> = Rc::new(RefCell::new(None));

        let on_open = {
            let ws = ws.clone();
            let handler = handler.clone();
            let heartbeat = heartbeat.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                let socket = SocketRef(ws.clone());
                handler.on_open(&socket);

                let ws = ws.clone();
                let handler = handler.clone();
                let timer = Interval::new(HEARTBEAT_INTERVAL_MS, move || {
                    handler.on_heartbeat(&SocketRef(ws.clone()));
                });
                *heartbeat.borrow_mut() = Some(timer);
            })
        };

        let on_message = {
            let ws = ws.clone();
            let handler = handler.clone();
            Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| match event.data().as_string() {
                Some(text) => handler.on_frame(&text, &SocketRef(ws.clone())),
                None => log::warn!("[REALTIME] Ignoring non-text frame"),
            })
        };

        let on_close = {
            let heartbeat = heartbeat.clone();
            Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
                heartbeat.borrow_mut().take();
                let reason = if event.reason().is_empty() {
                    format!("code {}", event.code())
                } else {
                    format!("code {}: {}", event.code(), event.reason())
                };
                handler.on_close(&reason);
            })
        };

        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        log::info!("[REALTIME] Connecting to {}", url.host_str().unwrap_or_default());

        Ok(Box::new(BrowserSocket {
            socket: SocketRef(ws),
            heartbeat,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
        }))
    }
}
