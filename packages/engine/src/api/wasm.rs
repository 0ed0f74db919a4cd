use wasm_bindgen::prelude::*;

use crate::domain::app_shell::{AppShell, ShellEffect, View};
use crate::domain::blog::{format_date, Blog, CommentBoard, NewPost};
use crate::domain::strategy::{self, AdviceSource};
use crate::domain::studio::{self, CampaignGoal};
use crate::services::{GeminiClient, KeyValueStore, LocalStorage, MemoryStore, StorageError};

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

/// Millisecond timestamp used as a record id, plus today's display date.
fn stamp() -> (u64, String) {
    let date = js_sys::Date::new_0();
    let id = js_sys::Date::now() as u64;
    (id, format_date(date.get_full_year() as i32, date.get_month(), date.get_date()))
}

/// Strategy pillars from the built-in table only.
#[wasm_bindgen(js_name = localStrategy)]
pub fn local_strategy(input: &str) -> String {
    strategy::local_strategy(input)
}

/// Strategy pillars for `input`, remote first. Empty string for blank input.
#[wasm_bindgen(js_name = marketingStrategy)]
pub async fn marketing_strategy(input: String, api_key: Option<String>) -> String {
    let client = GeminiClient::new(api_key);
    match strategy::advise(&client, &input).await {
        Some(advice) => {
            if advice.source == AdviceSource::Local {
                log::info!("strategy served from local table");
            }
            advice.text
        }
        None => String::new(),
    }
}

/// JSON array of `{title, hook, type}` ideas. `null` for a blank niche.
#[wasm_bindgen(js_name = studioIdeas)]
pub async fn studio_ideas(niche: String, goal: String, api_key: Option<String>) -> Result<Option<String>, JsValue> {
    let goal = CampaignGoal::parse(&goal).ok_or_else(|| js_error(format!("unknown goal: {goal}")))?;
    let client = GeminiClient::new(api_key);
    match studio::generate_ideas(&client, &niche, goal).await {
        Some(batch) => to_json(&batch.ideas).map(Some),
        None => Ok(None),
    }
}

/// `localStorage` when the page has it, otherwise a store that lasts for the
/// session.
enum PageStore {
    Local(LocalStorage),
    Session(MemoryStore),
}

impl PageStore {
    fn open() -> Self {
        match LocalStorage::open() {
            Ok(store) => PageStore::Local(store),
            Err(err) => {
                log::warn!("{err}; comments will not survive a reload");
                PageStore::Session(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for PageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            PageStore::Local(s) => s.get(key),
            PageStore::Session(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            PageStore::Local(s) => s.set(key, value),
            PageStore::Session(s) => s.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match self {
            PageStore::Local(s) => s.remove(key),
            PageStore::Session(s) => s.remove(key),
        }
    }
}

#[wasm_bindgen]
pub struct Comments {
    board: CommentBoard<PageStore>,
}

#[wasm_bindgen]
impl Comments {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Comments {
        Comments {
            board: CommentBoard::load(PageStore::open()),
        }
    }

    /// JSON array of the post's comments, oldest first
    #[wasm_bindgen(js_name = forPost)]
    pub fn for_post(&self, post_id: f64) -> Result<String, JsValue> {
        to_json(&self.board.for_post(post_id as u64))
    }

    #[wasm_bindgen(js_name = countFor)]
    pub fn count_for(&self, post_id: f64) -> usize {
        self.board.count_for(post_id as u64)
    }

    /// Returns the stored comment as JSON. Blank fields are rejected.
    pub fn add(&mut self, post_id: f64, author: &str, text: &str) -> Result<String, JsValue> {
        let (id, date) = stamp();
        let comment = self.board.add(post_id as u64, author, text, id, date).map_err(js_error)?;
        to_json(&comment)
    }

    pub fn delete(&mut self, id: f64) -> Result<bool, JsValue> {
        self.board.delete(id as u64).map_err(js_error)
    }
}

impl Default for Comments {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
pub struct Posts {
    blog: Blog,
}

#[wasm_bindgen]
impl Posts {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Posts {
        Posts { blog: Blog::default() }
    }

    /// JSON array, newest first
    pub fn list(&self) -> Result<String, JsValue> {
        to_json(self.blog.posts())
    }

    /// `draft_json` is `{title, category, excerpt, content}`; returns the
    /// published post as JSON.
    pub fn publish(&mut self, draft_json: &str) -> Result<String, JsValue> {
        let draft: NewPost = serde_json::from_str(draft_json).map_err(js_error)?;
        let (id, date) = stamp();
        let post = self.blog.publish(draft, id, date).map_err(js_error)?;
        to_json(post)
    }
}

impl Default for Posts {
    fn default() -> Self {
        Self::new()
    }
}

fn effect_names(effects: Vec<ShellEffect>) -> Vec<String> {
    effects
        .into_iter()
        .map(|e| {
            match e {
                ShellEffect::ScrollToTop => "scrollToTop",
                ShellEffect::ShowModal => "showModal",
                ShellEffect::HideModal => "hideModal",
            }
            .to_string()
        })
        .collect()
}

/// View routing and lead modal timing. Drive `tick` from the page's clock;
/// every method returns the effects to apply, by name.
#[wasm_bindgen]
pub struct Shell {
    shell: AppShell,
}

#[wasm_bindgen]
impl Shell {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Shell {
        Shell { shell: AppShell::new() }
    }

    pub fn view(&self) -> String {
        self.shell.view().as_str().to_string()
    }

    #[wasm_bindgen(js_name = isModalOpen)]
    pub fn is_modal_open(&self) -> bool {
        self.shell.is_modal_open()
    }

    pub fn mount(&mut self, now: f64) {
        self.shell.mount(now);
    }

    pub fn tick(&mut self, now: f64) -> Vec<String> {
        effect_names(self.shell.tick(now))
    }

    pub fn navigate(&mut self, view: &str) -> Result<Vec<String>, JsValue> {
        let view = View::parse(view).ok_or_else(|| js_error(format!("unknown view: {view}")))?;
        Ok(effect_names(self.shell.navigate(view)))
    }

    #[wasm_bindgen(js_name = openModal)]
    pub fn open_modal(&mut self) -> Vec<String> {
        effect_names(self.shell.open_modal())
    }

    #[wasm_bindgen(js_name = dismissModal)]
    pub fn dismiss_modal(&mut self) -> Vec<String> {
        effect_names(self.shell.dismiss_modal())
    }

    pub fn unmount(&mut self) {
        self.shell.unmount();
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}
