//! Toast Tray Component
//!
//! Renders the queued toasts; clicking one dismisses it early.

use leptos::prelude::*;

use crate::toast::{use_toasts, ToastKind};

#[component]
pub fn ToastTray() -> impl IntoView {
    let toasts = use_toasts();
    let items = toasts.items();

    view! {
        <div class="toast-tray">
            <For
                each=move || items.get()
                key=|t| t.id
                children=move |toast| {
                    let id = toast.id;
                    let kind_class = match toast.kind {
                        ToastKind::Error => "toast toast-error",
                        ToastKind::Success => "toast toast-success",
                    };
                    view! {
                        <div class=kind_class on:click=move |_| toasts.dismiss(id)>
                            {toast.text.clone()}
                        </div>
                    }
                }
            />
        </div>
    }
}
