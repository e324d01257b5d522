//! Toast Tray
//!
//! The single surface for transient messages. Every network failure ends
//! up here; toasts expire on their own.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

const TOAST_MS: u32 = 4000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Error,
    Success,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub kind: ToastKind,
    pub text: String,
}

/// Toast state handed out through context
#[derive(Clone, Copy)]
pub struct Toasts {
    items: ReadSignal<Vec<Toast>>,
    set_items: WriteSignal<Vec<Toast>>,
    counter: RwSignal<u32>,
}

impl Toasts {
    pub fn new() -> Self {
        let (items, set_items) = signal(Vec::new());
        Self {
            items,
            set_items,
            counter: RwSignal::new(0),
        }
    }

    pub fn items(&self) -> ReadSignal<Vec<Toast>> {
        self.items
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(ToastKind::Error, text.into());
    }

    pub fn success(&self, text: impl Into<String>) {
        self.push(ToastKind::Success, text.into());
    }

    pub fn dismiss(&self, id: u32) {
        self.set_items.update(|items| items.retain(|t| t.id != id));
    }

    fn push(&self, kind: ToastKind, text: String) {
        let id = self.counter.get_untracked() + 1;
        self.counter.set(id);
        self.set_items
            .update(|items| items.push(Toast { id, kind, text }));

        let set_items = self.set_items;
        spawn_local(async move {
            TimeoutFuture::new(TOAST_MS).await;
            set_items.update(|items| items.retain(|t| t.id != id));
        });
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the toast tray from context
pub fn use_toasts() -> Toasts {
    expect_context::<Toasts>()
}
