//! Chat Menu Component
//!
//! Internal chat list for the navigation rail. The badge sums the session
//! user's unread counters; rows refresh in place from the tenant channel.

use leptos::prelude::*;
use live_feed::UpsertPolicy;
use send_wrapper::SendWrapper;

use crate::api;
use crate::feed::LiveFeed;
use crate::models::{self, Chat};
use crate::session::{use_session, SessionStoreFields};
use crate::socket::SocketManager;

/// Chat navigation list with an unread badge
#[component]
pub fn ChatMenu() -> impl IntoView {
    let session = use_session();
    let socket = expect_context::<SocketManager>();

    let (search, set_search) = signal(String::new());

    let feed = LiveFeed::<Chat>::new(UpsertPolicy::Append);
    feed.connect(search, |term, page| async move {
        api::fetch_chats(&term, page).await
    });

    let company_id = session.company_id().get_untracked();
    let user_id = session.user_id().get_untracked();

    let handle = socket.subscribe(company_id);
    handle.on(&format!("company-{}-chat", company_id), move |data| {
        if let Some(chat) = models::parse_chat_event(data) {
            feed.upsert(chat);
        }
    });
    let handle = SendWrapper::new(handle);
    on_cleanup(move || drop(handle.take()));

    let items = feed.items();
    let loading = feed.loading();
    let unreads = Memo::new(move |_| items.with(|chats| models::chat_unreads(chats, user_id)));
    let has_unreads = move || unreads.get() > 0;

    view! {
        <nav class="chat-menu">
            <div class="chat-menu-head">
                <span class="chat-menu-title">"Chats"</span>
                <Show when=has_unreads>
                    <span class="chat-menu-badge">{move || unreads.get()}</span>
                </Show>
            </div>
            <input
                type="text"
                placeholder="Search chats"
                prop:value=move || search.get()
                on:input=move |ev| set_search.set(event_target_value(&ev))
            />
            <ul class="chat-list" on:scroll=move |ev| feed.handle_scroll(&ev)>
                <For
                    each=move || items.get()
                    key=move |c| {
                        (
                            c.id,
                            c.last_message.clone(),
                            c.updated_at.clone(),
                            models::member_unreads(c, user_id),
                        )
                    }
                    children=move |chat| view! { <ChatRow chat=chat user_id=user_id /> }
                />
                <Show when=move || !loading.get() && items.with(Vec::is_empty)>
                    <li class="popover-empty">"No chats"</li>
                </Show>
            </ul>
        </nav>
    }
}

/// One chat line
#[component]
fn ChatRow(chat: Chat, user_id: u32) -> impl IntoView {
    let unreads = models::member_unreads(&chat, user_id);
    let title = chat
        .title
        .clone()
        .unwrap_or_else(|| format!("Chat {}", chat.id));
    let date = chat
        .updated_at
        .as_deref()
        .map(models::short_date)
        .unwrap_or_default();

    view! {
        <li class="chat-row">
            <div class="chat-row-head">
                <span class="chat-title">{title}</span>
                {(unreads > 0).then(|| view! { <span class="chat-unreads">{unreads}</span> })}
            </div>
            {chat.last_message.clone().map(|m| view! { <p class="chat-last-message">{m}</p> })}
            <span class="chat-date">{date}</span>
        </li>
    }
}
