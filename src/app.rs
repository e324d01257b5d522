//! Atende Frontend App
//!
//! Composition root. Session, socket manager, toast tray, and the app
//! context are provided here; the shell owns the presence heartbeat, the
//! theme effect, and the kick on a concurrent login.

use gloo_timers::callback::Interval;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use send_wrapper::SendWrapper;
use serde_json::Value;

use crate::components::{
    AnnouncementsPopover, ChatMenu, NotificationsPopover, ThemeSwitch, ToastTray, UserForm,
    VolumeSlider,
};
use crate::context::AppContext;
use crate::models;
use crate::notifier::DesktopAlerts;
use crate::session::{self, SessionStoreFields};
use crate::socket::SocketManager;
use crate::toast::Toasts;

/// Presence heartbeat period
const HEARTBEAT_MS: u32 = 5 * 60 * 1000;

#[component]
pub fn App() -> impl IntoView {
    let session = Store::new(session::load());
    provide_context(session);

    let socket = SocketManager::new();
    provide_context(socket.clone());

    let toasts = Toasts::new();
    provide_context(toasts);

    let ctx = AppContext::new(signal(None::<u32>), DesktopAlerts::new());
    provide_context(ctx.clone());
    let open_ticket = ctx.open_ticket;

    Effect::new(move |_| session::apply_theme(session.theme().get()));

    let company_id = session.company_id().get_untracked();
    let user_id = session.user_id().get_untracked();

    // A login elsewhere invalidates this tab: say so, wipe the persisted
    // session, and start over.
    let handle = socket.subscribe(company_id);
    handle.on(&format!("company-{}-auth", company_id), move |data| {
        if models::parse_auth_kick(data) == Some(user_id) {
            toasts.error("Your account was opened on another device.");
            spawn_local(async move {
                TimeoutFuture::new(1_000).await;
                session::clear_persisted();
                if let Some(win) = web_sys::window() {
                    let _ = win.location().reload();
                }
            });
        }
    });
    handle.emit("userStatus", Value::Null);

    let beat = socket.subscribe(company_id);
    let heartbeat = Interval::new(HEARTBEAT_MS, move || {
        beat.emit("userStatus", Value::Null);
    });

    let lifetime = SendWrapper::new((handle, heartbeat));
    on_cleanup(move || drop(lifetime.take()));

    let (show_user_form, set_show_user_form) = signal(false);
    let close_form = Callback::new(move |_| set_show_user_form.set(false));

    let pane_ctx = ctx.clone();

    view! {
        <div class="app-shell">
            <header class="app-header">
                <span class="app-title">"Atende"</span>
                <AnnouncementsPopover />
                <NotificationsPopover />
                <VolumeSlider />
                <ThemeSwitch />
                <button
                    class="profile-button"
                    on:click=move |_| set_show_user_form.update(|v| *v = !*v)
                >
                    "Profile"
                </button>
            </header>

            <ChatMenu />

            <main class="main-pane">
                {move || match open_ticket.get() {
                    Some(id) => {
                        let close = pane_ctx.clone();
                        view! {
                            <section class="open-ticket">
                                <h2>{format!("Ticket #{}", id)}</h2>
                                <button class="close-ticket" on:click=move |_| close.clear_ticket()>
                                    "Close"
                                </button>
                            </section>
                        }
                            .into_any()
                    }
                    None => view! { <p class="main-placeholder">"Select a ticket"</p> }.into_any(),
                }}
            </main>

            <Show when=move || show_user_form.get()>
                <UserForm user_id=user_id on_close=close_form />
            </Show>

            <ToastTray />
        </div>
    }
}
