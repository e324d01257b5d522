//! Ticket Row Component
//!
//! One ticket in the notifications list: contact, markdown preview of the
//! last message, unread counter, and the accept action for pending tickets.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::context::use_app_context;
use crate::markdown;
use crate::models::{self, Ticket};
use crate::session::{use_session, SessionStoreFields};
use crate::toast::use_toasts;

#[component]
pub fn TicketRow(ticket: Ticket) -> impl IntoView {
    let session = use_session();
    let toasts = use_toasts();
    let row_ctx = use_app_context();
    let accept_ctx = use_app_context();

    let ticket_id = ticket.id;
    let pending = models::is_pending(&ticket);
    let unread = ticket.unread_messages;
    let preview = ticket
        .last_message
        .as_deref()
        .map(markdown::render_preview)
        .unwrap_or_default();

    let on_accept = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let user_id = session.user_id().get_untracked();
        let ctx = accept_ctx.clone();
        spawn_local(async move {
            match api::accept_ticket(ticket_id, user_id).await {
                Ok(()) => ctx.show_ticket(ticket_id),
                Err(e) => toasts.error(e.to_string()),
            }
        });
    };

    view! {
        <li
            class="ticket-row"
            on:click=move |_| {
                if !pending {
                    row_ctx.show_ticket(ticket_id);
                }
            }
        >
            <div class="ticket-body">
                <span class="ticket-contact">{ticket.contact.name.clone()}</span>
                <span class="ticket-preview" inner_html=preview></span>
                <span class="ticket-date">{models::short_date(&ticket.updated_at)}</span>
            </div>
            {(unread > 0).then(|| view! { <span class="ticket-unreads">{unread}</span> })}
            {pending
                .then(|| {
                    view! {
                        <button class="ticket-accept" on:click=on_accept>
                            "Accept"
                        </button>
                    }
                })}
        </li>
    }
}
