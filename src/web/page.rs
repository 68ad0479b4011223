// Page elements and rendering. Everything here is presentation: it reads a
// `GameSnapshot` / `GameEvent`s and never changes game state.
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Blob, BlobPropertyBag, Document, Element, HtmlAnchorElement, HtmlAudioElement,
    HtmlButtonElement, Url, window,
};

use crate::error::GameError;
use crate::game::{GameEvent, GameSnapshot, LOG_FILE_NAME, Phase};

const HIT_SOUND_SRC: &str = "audio/whack01.mp3";
const NEW_HIGH_SCORE_TEXT: &str = "🎉 New High Score! 🎉";
const HIGH_SCORE_RESET_TEXT: &str = "High Score Reset!";

pub struct Page {
    pub squares: Vec<Element>,
    pub time_left: Element,
    pub score: Element,
    pub high_score: Option<Element>,
    pub final_score: Option<Element>,
    pub start_button: HtmlButtonElement,
    pub pause_button: Option<HtmlButtonElement>,
    pub restart_button: Option<HtmlButtonElement>,
    pub reset_high_score_button: Option<HtmlButtonElement>,
    pub high_score_message: Option<Element>,
    /// `.difficulty-btn` elements with their `data-level`.
    pub difficulty_buttons: Vec<(Element, String)>,
    hit_sound: Option<HtmlAudioElement>,
    // Attached to every `play()` promise; autoplay refusals are not errors.
    swallow: Closure<dyn FnMut(JsValue)>,
}

impl Page {
    pub fn lookup(doc: &Document) -> Result<Self, GameError> {
        let squares = find_all(doc, ".square");
        if squares.is_empty() {
            return Err(GameError::MissingElement(".square"));
        }
        let difficulty_buttons: Vec<(Element, String)> = find_all(doc, ".difficulty-btn")
            .into_iter()
            .filter_map(|el| {
                let level = el.get_attribute("data-level")?;
                Some((el, level))
            })
            .collect();
        if difficulty_buttons.is_empty() {
            return Err(GameError::MissingElement(".difficulty-btn"));
        }
        let hit_sound = match HtmlAudioElement::new_with_src(HIT_SOUND_SRC) {
            Ok(audio) => Some(audio),
            Err(err) => {
                log::warn!("hit sound unavailable: {err:?}");
                None
            }
        };
        Ok(Self {
            squares,
            time_left: find(doc, "#time-left").ok_or(GameError::MissingElement("#time-left"))?,
            score: find(doc, "#score").ok_or(GameError::MissingElement("#score"))?,
            high_score: find(doc, "#high-score"),
            final_score: find(doc, "#final-score"),
            start_button: find_button(doc, "#start-button")
                .ok_or(GameError::MissingElement("#start-button"))?,
            pause_button: find_button(doc, "#pause-button"),
            restart_button: find_button(doc, "#restart-button"),
            reset_high_score_button: find_button(doc, "#reset-highscore-button"),
            high_score_message: find(doc, "#high-score-message"),
            difficulty_buttons,
            hit_sound,
            swallow: Closure::wrap(Box::new(|_err: JsValue| {}) as Box<dyn FnMut(JsValue)>),
        })
    }

    pub fn render(&self, snap: &GameSnapshot) {
        for (idx, square) in self.squares.iter().enumerate() {
            let _ = square.class_list().toggle_with_force("mole", snap.active_cell == Some(idx));
        }
        self.time_left.set_text_content(Some(&snap.time_remaining.to_string()));
        self.score.set_text_content(Some(&snap.score.to_string()));
        if let Some(el) = &self.high_score {
            el.set_text_content(Some(&snap.high_score.to_string()));
        }

        let in_round = matches!(snap.phase, Phase::Running | Phase::Paused);
        self.start_button.set_disabled(in_round);
        if let Some(btn) = &self.pause_button {
            btn.set_disabled(!in_round);
            let label = if snap.phase == Phase::Paused { "Resume" } else { "Pause" };
            btn.set_text_content(Some(label));
        }
        if let Some(btn) = &self.restart_button {
            btn.set_disabled(snap.phase == Phase::Idle);
        }
        for (btn, level) in &self.difficulty_buttons {
            let _ = btn.class_list().toggle_with_force("active", level == snap.difficulty.as_str());
        }
    }

    /// Applies one-shot effects. Returns true when the round just ended and
    /// the session log should be offered.
    pub fn apply_events(&self, events: &[GameEvent]) -> bool {
        let mut round_over = false;
        for event in events {
            match event {
                GameEvent::Hit { .. } => self.play_hit_sound(),
                GameEvent::Started { .. } | GameEvent::Reset => {
                    if let Some(el) = &self.final_score {
                        el.set_text_content(Some(""));
                    }
                }
                GameEvent::Ended { final_score, new_high_score, .. } => {
                    if let Some(el) = &self.final_score {
                        el.set_text_content(Some(&format!("Your final score: {final_score}")));
                    }
                    if *new_high_score {
                        self.flash_message(NEW_HIGH_SCORE_TEXT, 3000);
                    }
                    round_over = true;
                }
                GameEvent::HighScoreReset { .. } => self.flash_message(HIGH_SCORE_RESET_TEXT, 2000),
                _ => {}
            }
        }
        round_over
    }

    fn play_hit_sound(&self) {
        let Some(audio) = &self.hit_sound else { return };
        audio.set_current_time(0.0);
        if let Ok(promise) = audio.play() {
            let _ = promise.catch(&self.swallow);
        }
    }

    fn flash_message(&self, text: &str, millis: i32) {
        let Some(el) = &self.high_score_message else { return };
        el.set_text_content(Some(text));
        let _ = el.set_attribute("style", "display:block");
        let hide_el = el.clone();
        let hide = Closure::once_into_js(move || {
            let _ = hide_el.set_attribute("style", "display:none");
        });
        if let Some(win) = window() {
            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                hide.unchecked_ref(),
                millis,
            );
        }
    }
}

/// Offers `text` as a plain-text download named after the session log.
pub fn offer_download(doc: &Document, text: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(text));
    let opts = BlobPropertyBag::new();
    opts.set_type("text/plain");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)?;
    let url = Url::create_object_url_with_blob(&blob)?;
    let anchor: HtmlAnchorElement = doc.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(LOG_FILE_NAME);
    anchor.click();
    Url::revoke_object_url(&url)?;
    Ok(())
}

fn find(doc: &Document, selector: &str) -> Option<Element> {
    doc.query_selector(selector).ok().flatten()
}

fn find_button(doc: &Document, selector: &str) -> Option<HtmlButtonElement> {
    find(doc, selector)?.dyn_into().ok()
}

fn find_all(doc: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = doc.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
