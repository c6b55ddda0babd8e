//! DOM event listeners
//!
//! Every listener turns a browser event into an [`InputEvent`], hands it to
//! the session and redraws when something changed.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Element, Event, HtmlInputElement, KeyboardEvent, MouseEvent};

use crossword_web_client::{InputEvent, Instruction};

use crate::{dom, App};

pub fn install(app: &App) -> Result<(), JsValue> {
    let document = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    setup_keyboard(app, &document)?;
    setup_board(app, &document)?;
    setup_controls(app, &document)?;
    Ok(())
}

fn dispatch(app: &App, event: &InputEvent) -> bool {
    let instruction = app.borrow_mut().handle_input(event);
    if instruction == Instruction::None {
        return false;
    }
    dom::render(&app.borrow());
    true
}

/// Key value the interpreter understands; letters arrive lowercased
fn normalize_key(key: String) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_ascii_lowercase().to_string(),
        _ => key,
    }
}

fn setup_keyboard(app: &App, document: &Document) -> Result<(), JsValue> {
    let app = app.clone();
    let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
        if e.ctrl_key() || e.meta_key() || e.alt_key() {
            return;
        }
        // Typing into the settings field is not a move
        if e
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            .is_some()
        {
            return;
        }
        let event = InputEvent::Key(normalize_key(e.key()));
        if dispatch(&app, &event) {
            e.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();
    Ok(())
}

/// Index of the board cell under a mouse event
fn cell_index(e: &MouseEvent) -> Option<usize> {
    let target = e.target()?.dyn_into::<Element>().ok()?;
    let cell = target.closest("[data-index]").ok()??;
    cell.get_attribute("data-index")?.parse().ok()
}

fn setup_board(app: &App, document: &Document) -> Result<(), JsValue> {
    let Some(board) = document.get_element_by_id("board") else {
        tracing::warn!("No #board element, clicks disabled");
        return Ok(());
    };

    let app_click = app.clone();
    let onclick = Closure::wrap(Box::new(move |e: MouseEvent| {
        if let Some(index) = cell_index(&e) {
            dispatch(&app_click, &InputEvent::Click(index));
        }
    }) as Box<dyn FnMut(_)>);
    board.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
    onclick.forget();

    let app_dbl = app.clone();
    let ondblclick = Closure::wrap(Box::new(move |e: MouseEvent| {
        if let Some(index) = cell_index(&e) {
            dispatch(&app_dbl, &InputEvent::DoubleClick(index));
        }
    }) as Box<dyn FnMut(_)>);
    board.add_event_listener_with_callback("dblclick", ondblclick.as_ref().unchecked_ref())?;
    ondblclick.forget();

    Ok(())
}

fn setup_controls(app: &App, document: &Document) -> Result<(), JsValue> {
    if let Some(button) = document.get_element_by_id("reveal") {
        let app = app.clone();
        let onreveal = Closure::wrap(Box::new(move || {
            dispatch(&app, &InputEvent::Reveal);
        }) as Box<dyn FnMut()>);
        button.add_event_listener_with_callback("click", onreveal.as_ref().unchecked_ref())?;
        onreveal.forget();
    }

    if let Some(toggle) = document.get_element_by_id("show-wrong") {
        let app = app.clone();
        let onchange = Closure::wrap(Box::new(move |e: Event| {
            let checked = e
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                .is_some_and(|input| input.checked());
            app.borrow_mut().set_show_wrong(checked);
            dom::render(&app.borrow());
        }) as Box<dyn FnMut(_)>);
        toggle.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    if let Some(form) = document.get_element_by_id("relay-form") {
        let app = app.clone();
        let onsubmit = Closure::wrap(Box::new(move |e: Event| {
            e.prevent_default();
            let Some(raw) = dom::relay_url_value() else {
                return;
            };
            let result = app.borrow_mut().config_mut().set_relay_url(&raw);
            match result {
                Ok(()) => {
                    dom::show_relay_url(app.borrow().config().relay_url().as_str());
                    crate::connect(&app);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Rejected relay URL");
                    dom::show_error(&err.to_string());
                }
            }
        }) as Box<dyn FnMut(_)>);
        form.add_event_listener_with_callback("submit", onsubmit.as_ref().unchecked_ref())?;
        onsubmit.forget();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Q".to_string()), "q");
        assert_eq!(normalize_key("x".to_string()), "x");
        assert_eq!(normalize_key("ArrowLeft".to_string()), "ArrowLeft");
        assert_eq!(normalize_key(" ".to_string()), " ");
    }
}
