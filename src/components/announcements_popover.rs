//! Announcements Popover Component
//!
//! Paginated announcement list kept fresh by the tenant push channel. A
//! dot on the trigger marks arrivals the user has not looked at yet.

use leptos::prelude::*;
use live_feed::UpsertPolicy;
use send_wrapper::SendWrapper;

use crate::api;
use crate::feed::LiveFeed;
use crate::models::{self, Announcement, AnnouncementChange};
use crate::session::{use_session, SessionStoreFields};
use crate::socket::SocketManager;

/// Announcements bell with search and infinite scroll
#[component]
pub fn AnnouncementsPopover() -> impl IntoView {
    let session = use_session();
    let socket = expect_context::<SocketManager>();

    let (open, set_open) = signal(false);
    let (unseen, set_unseen) = signal(false);
    let (search, set_search) = signal(String::new());

    let feed = LiveFeed::<Announcement>::new(UpsertPolicy::Front);
    feed.connect(search, |term, page| async move {
        api::fetch_announcements(&term, page).await
    });

    let company_id = session.company_id().get_untracked();
    let handle = socket.subscribe(company_id);
    handle.on("company-announcement", move |data| {
        match models::parse_announcement_event(data) {
            Some(AnnouncementChange::Upsert(record)) => {
                feed.upsert(record);
                set_unseen.set(true);
            }
            Some(AnnouncementChange::Delete(id)) => feed.remove(id),
            None => {}
        }
    });
    let handle = SendWrapper::new(handle);
    on_cleanup(move || drop(handle.take()));

    let items = feed.items();
    let loading = feed.loading();

    view! {
        <div class="announcements-popover">
            <button
                class="popover-trigger"
                class:with-dot=move || unseen.get()
                on:click=move |_| {
                    set_open.update(|v| *v = !*v);
                    set_unseen.set(false);
                }
            >
                "Announcements"
            </button>
            <Show when=move || open.get()>
                <div class="popover-panel">
                    <input
                        type="text"
                        placeholder="Search announcements"
                        prop:value=move || search.get()
                        on:input=move |ev| set_search.set(event_target_value(&ev))
                    />
                    <ul class="popover-list" on:scroll=move |ev| feed.handle_scroll(&ev)>
                        <For
                            each=move || items.get()
                            key=|a| (a.id, a.title.clone(), a.text.clone(), a.priority)
                            children=move |a| view! { <AnnouncementRow announcement=a /> }
                        />
                        <Show when=move || !loading.get() && items.with(Vec::is_empty)>
                            <li class="popover-empty">"No announcements"</li>
                        </Show>
                    </ul>
                </div>
            </Show>
        </div>
    }
}

/// One announcement line
#[component]
fn AnnouncementRow(announcement: Announcement) -> impl IntoView {
    let priority = announcement.priority;
    view! {
        <li class="announcement-row">
            <div class="announcement-head">
                <span class="announcement-title">{announcement.title}</span>
                <span class=format!("announcement-priority priority-{}", priority)>
                    {priority_label(priority)}
                </span>
            </div>
            <p class="announcement-text">{announcement.text}</p>
            <span class="announcement-date">{models::short_date(&announcement.created_at)}</span>
        </li>
    }
}

fn priority_label(priority: u8) -> &'static str {
    match priority {
        1 => "High",
        2 => "Medium",
        _ => "Low",
    }
}
