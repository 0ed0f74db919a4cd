//! Top-level view routing and the delayed lead modal.

use serde::{Deserialize, Serialize};

use crate::core::scheduler::{Scheduler, TimerId};

/// Delay before the lead modal opens on its own
pub const LEAD_MODAL_DELAY_MS: f64 = 4_000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Home,
    Blog,
    Studio,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Blog => "blog",
            View::Studio => "studio",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "home" => Some(View::Home),
            "blog" => Some(View::Blog),
            "studio" => Some(View::Studio),
            _ => None,
        }
    }
}

/// Side effects the page has to carry out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellEffect {
    ScrollToTop,
    ShowModal,
    HideModal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LeadModal;

pub struct AppShell {
    view: View,
    modal_open: bool,
    scheduler: Scheduler<LeadModal>,
    modal_timer: Option<TimerId>,
}

impl Default for AppShell {
    fn default() -> Self {
        Self::new()
    }
}

impl AppShell {
    pub fn new() -> Self {
        Self {
            view: View::Home,
            modal_open: false,
            scheduler: Scheduler::new(0.0),
            modal_timer: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn modal_pending(&self) -> bool {
        self.modal_timer.is_some_and(|id| self.scheduler.is_scheduled(id))
    }

    /// Arm the lead modal. A second mount while armed is ignored.
    pub fn mount(&mut self, now: f64) {
        self.scheduler.set_now(now);
        if self.modal_pending() {
            return;
        }
        self.modal_timer = Some(self.scheduler.schedule_once(LEAD_MODAL_DELAY_MS, LeadModal));
    }

    pub fn tick(&mut self, now: f64) -> Vec<ShellEffect> {
        let mut effects = Vec::new();
        while let Some((id, LeadModal)) = self.scheduler.pop_due(now) {
            if self.modal_timer == Some(id) {
                self.modal_timer = None;
            }
            if !self.modal_open {
                self.modal_open = true;
                effects.push(ShellEffect::ShowModal);
            }
        }
        self.scheduler.set_now(now);
        effects
    }

    pub fn open_modal(&mut self) -> Vec<ShellEffect> {
        self.cancel_timer();
        if self.modal_open {
            return Vec::new();
        }
        self.modal_open = true;
        vec![ShellEffect::ShowModal]
    }

    /// Close the modal, or stop it from ever opening if it has not yet.
    pub fn dismiss_modal(&mut self) -> Vec<ShellEffect> {
        self.cancel_timer();
        if !self.modal_open {
            return Vec::new();
        }
        self.modal_open = false;
        vec![ShellEffect::HideModal]
    }

    /// Switch views. Every navigation scrolls back to the top, even to the
    /// current view.
    pub fn navigate(&mut self, view: View) -> Vec<ShellEffect> {
        if view != self.view {
            log::debug!("view {} -> {}", self.view.as_str(), view.as_str());
        }
        self.view = view;
        vec![ShellEffect::ScrollToTop]
    }

    pub fn unmount(&mut self) {
        self.cancel_timer();
        self.scheduler.clear();
    }

    fn cancel_timer(&mut self) {
        if let Some(id) = self.modal_timer.take() {
            self.scheduler.cancel(id);
        }
    }
}
