use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use crossword_web_client::transport::Transport;
use crossword_web_client::{ClientConfig, ClientError};
use crossword_web_protocol::Frame;

use crate::dom;
use crate::App;

/// Browser WebSocket behind the client [`Transport`] seam
#[derive(Debug, Default)]
pub struct WsTransport {
    ws: Option<WebSocket>,
}

impl WsTransport {
    /// Placeholder used before the first socket is opened
    pub const fn detached() -> Self {
        Self { ws: None }
    }

    /// Detach the handlers and close; no callback fires afterwards
    pub fn close(&self) {
        if let Some(ws) = &self.ws {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onerror(None);
            ws.set_onclose(None);
            let _ = ws.close();
        }
    }
}

impl Transport for WsTransport {
    fn send(&mut self, frame: &Frame) -> crossword_web_client::Result<()> {
        let ws = self
            .ws
            .as_ref()
            .filter(|ws| ws.ready_state() == WebSocket::OPEN)
            .ok_or(ClientError::NotConnected)?;
        let text = frame.to_text()?;
        ws.send_with_str(&text)
            .map_err(|e| ClientError::Transport(format!("{e:?}")))
    }

    fn is_connected(&self) -> bool {
        self.ws
            .as_ref()
            .is_some_and(|ws| ws.ready_state() == WebSocket::OPEN)
    }
}

pub fn open(app: &App, config: &ClientConfig) -> Result<WsTransport, JsValue> {
    let url = config
        .socket_url()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let ws = WebSocket::new(url.as_str())?;
    tracing::info!(url = %url, "Connecting to relay");

    // ON OPEN
    let app_open = app.clone();
    let onopen = Closure::wrap(Box::new(move || {
        tracing::info!("Socket connected");
        dom::render(&app_open.borrow());
    }) as Box<dyn FnMut()>);
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    // ON MESSAGE
    let app_message = app.clone();
    let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
        let Some(text) = e.data().as_string() else {
            tracing::debug!("Ignoring binary frame");
            return;
        };
        let changed = app_message.borrow_mut().handle_text(&text);
        if changed {
            dom::render(&app_message.borrow());
        }
    }) as Box<dyn FnMut(_)>);
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    // ON ERROR
    let app_error = app.clone();
    let onerror = Closure::wrap(Box::new(move |_e: ErrorEvent| {
        tracing::warn!("Socket error");
        dom::render(&app_error.borrow());
    }) as Box<dyn FnMut(_)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    // ON CLOSE
    let app_close = app.clone();
    let onclose = Closure::wrap(Box::new(move |e: CloseEvent| {
        tracing::warn!(code = e.code(), reason = %e.reason(), "Socket closed");
        dom::render(&app_close.borrow());
    }) as Box<dyn FnMut(_)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    Ok(WsTransport { ws: Some(ws) })
}
