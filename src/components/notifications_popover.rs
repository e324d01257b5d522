//! Notifications Popover Component
//!
//! Tickets with unread messages, fed by the paginated listing and the
//! tenant channel. New-message events raise desktop notifications through
//! the alert policy; updateUnread/delete events retire them. The tab title
//! carries the current count.

use leptos::prelude::*;
use live_feed::UpsertPolicy;
use send_wrapper::SendWrapper;

use crate::api;
use crate::components::TicketRow;
use crate::context::use_app_context;
use crate::feed::LiveFeed;
use crate::models::{self, Ticket};
use crate::notifier::{self, DesktopAlerts};
use crate::session::{use_session, SessionStoreFields};
use crate::socket::SocketManager;

/// Unread-ticket bell with desktop notification dispatch
#[component]
pub fn NotificationsPopover() -> impl IntoView {
    let session = use_session();
    let socket = expect_context::<SocketManager>();
    let ctx = use_app_context();

    let (open, set_open) = signal(false);
    let (search, _set_search) = signal(String::new());

    let feed = LiveFeed::<Ticket>::new(UpsertPolicy::Front);
    feed.connect(search, |_, page| async move {
        api::fetch_unread_tickets(page).await
    });

    DesktopAlerts::request_permission();

    let company_id = session.company_id().get_untracked();
    let user_id = session.user_id().get_untracked();

    let handle = socket.subscribe(company_id);
    handle.emit("joinNotification", serde_json::Value::Null);

    {
        let alerts = ctx.alerts.clone();
        handle.on(&format!("company-{}-ticket", company_id), move |data| {
            if let Some(ticket_id) = models::parse_ticket_clear(data) {
                feed.remove(ticket_id);
                alerts.dismiss(ticket_id);
            }
        });
    }
    {
        let alerts = ctx.alerts.clone();
        let ctx = ctx.clone();
        handle.on(&format!("company-{}-appMessage", company_id), move |data| {
            let Some(arrival) = models::parse_message_event(data) else {
                return;
            };
            if !notifier::concerns_session(&arrival, user_id) {
                return;
            }
            feed.upsert(arrival.ticket.clone());

            let alert_ctx = notifier::AlertContext {
                session_user_id: user_id,
                open_ticket_id: ctx.open_ticket.get_untracked(),
                page_visible: notifier::page_visible(),
            };
            if !notifier::should_suppress(&arrival, alert_ctx) {
                let on_click = ctx.clone();
                alerts.issue(&arrival, session.volume().get_untracked(), move |ticket_id| {
                    on_click.show_ticket(ticket_id)
                });
            }
        });
    }
    let handle = SendWrapper::new(handle);
    on_cleanup(move || drop(handle.take()));

    let items = feed.items();
    let loading = feed.loading();
    Effect::new(move |_| notifier::set_tab_title(items.get().len()));

    let count = move || items.get().len();
    let has_unread = move || count() > 0;

    view! {
        <div class="notifications-popover">
            <button class="popover-trigger" on:click=move |_| set_open.update(|v| *v = !*v)>
                "Tickets"
                <Show when=has_unread>
                    <span class="popover-badge">{count}</span>
                </Show>
            </button>
            <Show when=move || open.get()>
                <div class="popover-panel">
                    <ul class="popover-list" on:scroll=move |ev| feed.handle_scroll(&ev)>
                        <For
                            each=move || items.get()
                            // Key on every rendered field so in-place upserts re-render the row
                            key=|t| {
                                (
                                    t.id,
                                    t.status.clone(),
                                    t.unread_messages,
                                    t.last_message.clone(),
                                    t.updated_at.clone(),
                                )
                            }
                            children=move |t| view! { <TicketRow ticket=t /> }
                        />
                        <Show when=move || !loading.get() && items.with(Vec::is_empty)>
                            <li class="popover-empty">"Nothing new"</li>
                        </Show>
                    </ul>
                </div>
            </Show>
        </div>
    }
}
