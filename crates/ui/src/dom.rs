use std::collections::BTreeSet;

use wasm_bindgen::JsCast;
use web_sys::{window, Document, Element, HtmlElement, HtmlInputElement};

use crossword_web_client::transport::Transport;
use crossword_web_client::{Cell, ConnectionState, CrosswordSession, Direction, Puzzle, Selection};

use crate::network::WsTransport;

/// Get document helper
fn get_document() -> Option<Document> {
    window().and_then(|w| w.document())
}

fn get_element(id: &str) -> Option<Element> {
    get_document().and_then(|doc| doc.get_element_by_id(id))
}

fn get_input(id: &str) -> Option<HtmlInputElement> {
    get_element(id).and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
}

/// Put the current relay URL in the settings field
pub fn show_relay_url(url: &str) {
    if let Some(input) = get_input("relay-url") {
        input.set_value(url);
    }
}

/// Value typed into the settings field
pub fn relay_url_value() -> Option<String> {
    get_input("relay-url").map(|input| input.value())
}

pub fn show_error(message: &str) {
    if let Some(el) = get_element("error") {
        el.set_text_content(Some(message));
    }
}

/// Recreate one element per cell after a puzzle load
pub fn build_board(puzzle: &Puzzle) {
    let (Some(doc), Some(board)) = (get_document(), get_element("board")) else {
        return;
    };
    board.set_inner_html("");
    if let Ok(html) = board.clone().dyn_into::<HtmlElement>() {
        let _ = html.style().set_property(
            "grid-template-columns",
            &format!("repeat({}, var(--cell-size))", puzzle.cols()),
        );
    }

    for index in 0..puzzle.len() {
        let Ok(cell) = doc.create_element("div") else {
            return;
        };
        let _ = cell.set_attribute("data-index", &index.to_string());
        let number = puzzle.number(index);
        if number > 0 {
            let _ = cell.set_attribute("data-num", &number.to_string());
        }
        let _ = board.append_child(&cell);
    }
}

/// Redraw everything derived from the session
pub fn render(session: &CrosswordSession<WsTransport>) {
    let puzzle = session.puzzle();
    let selection = session.selection();

    if let Some(el) = get_element("puzzle-title") {
        el.set_text_content(Some(puzzle.title()));
    }
    if let Some(el) = get_element("status") {
        let label = status_label(session.state(), session.transport().is_connected());
        el.set_text_content(Some(label));
        el.set_class_name(&format!("status-{label}"));
    }
    if let Some(el) = get_element("clue") {
        el.set_text_content(Some(&clue_label(puzzle, selection)));
    }
    if let Some(input) = get_input("show-wrong") {
        input.set_checked(session.show_wrong());
    }
    if session.state() == ConnectionState::Connected {
        show_error("");
    }

    let Some(board) = get_element("board") else {
        return;
    };
    let cells = board.children();
    for index in 0..puzzle.len() {
        let Some(el) = u32::try_from(index).ok().and_then(|i| cells.item(i)) else {
            break;
        };
        el.set_class_name(&cell_class(puzzle, selection, session.wrong_cells(), index));
        let text = puzzle.cell(index).letter().map(String::from);
        el.set_text_content(text.as_deref());
    }
}

/// CSS classes for one cell
pub fn cell_class(
    puzzle: &Puzzle,
    selection: &Selection,
    wrong: &BTreeSet<usize>,
    index: usize,
) -> String {
    if puzzle.cell(index) == Cell::Block {
        return "cell block".to_string();
    }
    let mut class = String::from("cell");
    if index == selection.selected {
        class.push_str(" selected");
    } else if selection.is_highlighted(index) {
        class.push_str(" highlighted");
    }
    if selection.has_remote_cursor(index) {
        class.push_str(" remote");
    }
    if puzzle.is_revealed(index) {
        class.push_str(" revealed");
    }
    if wrong.contains(&index) {
        class.push_str(" wrong");
    }
    class
}

/// Clue bar text, e.g. `4 Down: Amber, once`
pub fn clue_label(puzzle: &Puzzle, selection: &Selection) -> String {
    let direction = match selection.direction {
        Direction::Across => "Across",
        Direction::Down => "Down",
    };
    match selection.active_clue(puzzle) {
        Some(clue) => format!("{} {direction}: {}", clue.number, clue.text),
        None => String::new(),
    }
}

pub const fn status_label(state: ConnectionState, socket_open: bool) -> &'static str {
    match state {
        ConnectionState::Disconnected => "disconnected",
        ConnectionState::Downloading => "loading",
        ConnectionState::Connected if socket_open => "connected",
        ConnectionState::Connected => "offline",
    }
}
