//! Browser adapter: boots the board on the page, routes DOM events and timer
//! fires into the round state machine and re-renders after each of them.
//!
//! The single `Game` lives in a `thread_local!` next to its page elements.
//! Every entry point (click, interval fire) borrows it through `dispatch`,
//! runs one transition to completion, renders, and releases the borrow before
//! any follow-up side effect (log download) runs.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, window};

use crate::game::{Game, GameConfig, Timer};
use crate::mole::MoleSpawner;
use crate::storage::{MemoryStorage, Storage};

mod interval;
mod local_storage;
mod page;

pub use interval::IntervalScheduler;
pub use local_storage::LocalStorage;
use page::{Page, offer_download};

type PageGame = Game<IntervalScheduler, Box<dyn Storage>>;

struct App {
    game: PageGame,
    page: Page,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

pub fn start_whack_a_mole() -> Result<(), JsValue> {
    if APP.with(|cell| cell.borrow().is_some()) {
        log::debug!("board already running");
        return Ok(());
    }
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let page = Page::lookup(&doc)?;
    let store: Box<dyn Storage> = match LocalStorage::open() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("localStorage unavailable, high scores will not persist");
            Box::new(MemoryStorage::new())
        }
    };
    let config = GameConfig { cell_count: page.squares.len(), ..GameConfig::default() };
    let scheduler = IntervalScheduler::new(win, on_timer_fired);
    let game = Game::new(config, scheduler, store, MoleSpawner::default());

    install_listeners(&page)?;
    page.render(&game.snapshot());
    log::info!(
        "board ready: {} cells, difficulty {}",
        page.squares.len(),
        game.difficulty()
    );
    APP.with(|cell| cell.replace(Some(App { game, page })));
    Ok(())
}

#[cfg(feature = "serde_json")]
pub fn snapshot_json() -> Option<String> {
    APP.with(|cell| {
        let slot = cell.borrow();
        let app = slot.as_ref()?;
        serde_json::to_string(&app.game.snapshot()).ok()
    })
}

/// Runs one transition against the live game, then renders.
fn dispatch(action: impl FnOnce(&mut PageGame)) {
    let export = APP.with(|cell| {
        let mut slot = cell.borrow_mut();
        let app = slot.as_mut()?;
        action(&mut app.game);
        let events = app.game.drain_events();
        app.page.render(&app.game.snapshot());
        app.page
            .apply_events(&events)
            .then(|| app.game.session_log().contents())
    });
    if let Some(text) = export {
        if let Some(doc) = window().and_then(|w| w.document()) {
            if let Err(err) = offer_download(&doc, &text) {
                log::warn!("session log download failed: {err:?}");
            }
        }
    }
}

fn on_timer_fired(timer: Timer) {
    dispatch(|game| {
        if let Some(handle) = game.scheduler().live_handle(timer) {
            game.on_timer(handle, timer);
        }
    });
}

fn listen(
    target: &EventTarget,
    event: &str,
    mut handler: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let closure =
        Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| handler()) as Box<dyn FnMut(_)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn install_listeners(page: &Page) -> Result<(), JsValue> {
    for (idx, square) in page.squares.iter().enumerate() {
        listen(square, "mousedown", move || {
            dispatch(|game| {
                game.hit(idx);
            })
        })?;
    }
    listen(&page.start_button, "click", || {
        dispatch(|game| {
            game.start();
        })
    })?;
    if let Some(btn) = &page.pause_button {
        listen(btn, "click", || {
            dispatch(|game| {
                game.toggle_pause();
            })
        })?;
    }
    if let Some(btn) = &page.restart_button {
        listen(btn, "click", || dispatch(|game| game.restart()))?;
    }
    if let Some(btn) = &page.reset_high_score_button {
        listen(btn, "click", confirm_reset_high_score)?;
    }
    for (btn, level) in &page.difficulty_buttons {
        let level = level.clone();
        listen(btn, "click", move || {
            dispatch(|game| {
                if let Err(err) = game.change_difficulty(&level) {
                    log::warn!("{err}");
                }
            })
        })?;
    }
    Ok(())
}

// The confirm dialog runs outside the game borrow.
fn confirm_reset_high_score() {
    let Some(difficulty) = APP.with(|cell| cell.borrow().as_ref().map(|app| app.game.difficulty()))
    else {
        return;
    };
    let prompt = format!("Reset {} High Score?", difficulty.as_str().to_uppercase());
    let confirmed = window()
        .and_then(|w| w.confirm_with_message(&prompt).ok())
        .unwrap_or(false);
    if confirmed {
        dispatch(|game| game.reset_high_score());
    }
}
