//! crossword-web browser frontend
//!
//! Thin presentation layer over `crossword-web-client`: DOM rendering,
//! event listeners and the WebSocket transport. All game rules live in the
//! client crate.

mod dom;
mod input;
mod network;

use std::cell::RefCell;
use std::rc::Rc;

use crossword_web_client::download::fetch_document;
use crossword_web_client::{ClientConfig, CrosswordSession};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::network::WsTransport;

/// Session shared by every callback on the page
pub type App = Rc<RefCell<CrosswordSession<WsTransport>>>;

#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let app: App = Rc::new(RefCell::new(CrosswordSession::new(
        ClientConfig::default(),
        WsTransport::detached(),
    )));

    dom::show_relay_url(app.borrow().config().relay_url().as_str());
    input::install(&app)?;
    connect(&app);
    Ok(())
}

/// Open the socket and download the puzzle for the current relay URL
///
/// The socket goes first so edits made while the download is in flight are
/// either in the snapshot or arrive afterwards.
pub fn connect(app: &App) {
    let config = app.borrow().config().clone();

    match network::open(app, &config) {
        Ok(transport) => {
            let old = app.borrow_mut().replace_transport(transport);
            old.close();
        }
        Err(e) => tracing::warn!(error = ?e, "Failed to open socket"),
    }

    app.borrow_mut().begin_download();
    dom::render(&app.borrow());

    let app = app.clone();
    spawn_local(async move {
        let result = fetch_document(&config).await;
        let mut session = app.borrow_mut();
        match result {
            Ok(doc) => {
                if session.load_document(&doc).is_ok() {
                    dom::build_board(session.puzzle());
                }
            }
            Err(e) => {
                session.download_failed(&e);
                dom::render(&session);
                dom::show_error(&format!("Puzzle download failed: {e}"));
                return;
            }
        }
        dom::render(&session);
    });
}
