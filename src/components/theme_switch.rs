//! Theme Switch Component
//!
//! Light / dark / system selector. The choice is persisted; applying the
//! resolved scheme to the document happens at the app shell.

use leptos::prelude::*;

use crate::session::{self, use_session, SessionStoreFields, ThemePref};

#[component]
pub fn ThemeSwitch() -> impl IntoView {
    let session = use_session();
    let theme = session.theme();

    let choose = move |pick: ThemePref| {
        theme.set(pick);
        session::persist_theme(pick);
    };

    let option = move |pick: ThemePref, label: &'static str| {
        view! {
            <button
                class="theme-option"
                class:active=move || theme.get() == pick
                on:click=move |_| choose(pick)
            >
                {label}
            </button>
        }
    };

    view! {
        <div class="theme-switch">
            {option(ThemePref::Light, "Light")}
            {option(ThemePref::Dark, "Dark")}
            {option(ThemePref::System, "System")}
        </div>
    }
}
