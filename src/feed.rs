//! Feed Glue
//!
//! Bridges [`live_feed::PagedFeed`] into Leptos signals: reset on filter
//! change, debounced page loads, scroll-driven pagination, one toast per
//! failed fetch. Every live list in the app goes through this wrapper.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use live_feed::{FeedEvent, Key, PagedFeed, ScrollMetrics, UpsertPolicy};

use crate::api::ApiResult;
use crate::models::Page;
use crate::toast::use_toasts;

/// Delay between a trigger and the fetch it schedules, so rapid changes
/// coalesce into one request.
const DEBOUNCE_MS: u32 = 500;

/// A reconciled list exposed to the view as signals.
///
/// The reconciler itself lives in an arena slot and is only touched through
/// untracked access; the view subscribes to the derived `items`, `loading`,
/// and `page` signals instead. The handle is `Copy`, so it can move into as
/// many closures as the view needs.
pub struct LiveFeed<T>
where
    T: Key + Clone + Send + Sync + 'static,
    T::Id: Send + Sync + 'static,
{
    state: RwSignal<PagedFeed<T>>,
    items: RwSignal<Vec<T>>,
    loading: RwSignal<bool>,
    page: RwSignal<u32>,
}

impl<T> Clone for LiveFeed<T>
where
    T: Key + Clone + Send + Sync + 'static,
    T::Id: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LiveFeed<T>
where
    T: Key + Clone + Send + Sync + 'static,
    T::Id: Send + Sync + 'static,
{
}

impl<T> LiveFeed<T>
where
    T: Key + Clone + Send + Sync + 'static,
    T::Id: Send + Sync + 'static,
{
    pub fn new(policy: UpsertPolicy) -> Self {
        Self {
            state: RwSignal::new(PagedFeed::new(policy)),
            items: RwSignal::new(Vec::new()),
            loading: RwSignal::new(false),
            page: RwSignal::new(1),
        }
    }

    pub fn items(&self) -> RwSignal<Vec<T>> {
        self.items
    }

    pub fn loading(&self) -> RwSignal<bool> {
        self.loading
    }

    /// Copy reconciler state out into the view signals
    fn sync(&self) {
        let (items, loading) = self
            .state
            .with_untracked(|state| (state.items().to_vec(), state.loading()));
        self.items.set(items);
        self.loading.set(loading);
    }

    /// Apply one push event and refresh the view
    pub fn apply(&self, event: FeedEvent<T>) {
        self.state.update_untracked(|state| state.apply(event));
        self.sync();
    }

    pub fn upsert(&self, record: T) {
        self.apply(FeedEvent::Upsert(record));
    }

    pub fn remove(&self, id: T::Id) {
        self.apply(FeedEvent::Remove(id));
    }

    /// Wire the load cycle. The filter signal resets the feed back to page
    /// 1; filter and page changes both schedule a debounced fetch of the
    /// current page. A response that was superseded while waiting is
    /// dropped by the reconciler's generation check.
    pub fn connect<F, Fut>(self, search: ReadSignal<String>, fetch: F)
    where
        F: Fn(String, u32) -> Fut + 'static,
        Fut: Future<Output = ApiResult<Page<T>>> + 'static,
    {
        let toasts = use_toasts();
        let fetch = Rc::new(fetch);
        let runs = Rc::new(Cell::new(0u64));

        Effect::new(move |_| {
            search.track();
            self.state.update_untracked(|state| state.reset());
            self.page.set(1);
            self.sync();
        });

        Effect::new(move |_| {
            let term = search.get();
            self.page.track();
            // Loading goes up before the debounce window so the scroll
            // trigger cannot advance the page twice.
            let ticket = self.state.update_untracked(|state| state.begin_fetch());
            self.loading.set(true);

            let run = runs.get() + 1;
            runs.set(run);

            let fetch = Rc::clone(&fetch);
            let runs = Rc::clone(&runs);
            spawn_local(async move {
                TimeoutFuture::new(DEBOUNCE_MS).await;
                if runs.get() != run {
                    return;
                }
                match fetch(term, ticket.page()).await {
                    Ok(page) => {
                        let merged = self.state.update_untracked(|state| {
                            state.absorb_page(ticket, page.records, page.has_more)
                        });
                        if merged {
                            self.sync();
                        }
                    }
                    Err(e) => {
                        self.state.update_untracked(|state| state.fetch_failed(ticket));
                        self.sync();
                        toasts.error(e.to_string());
                    }
                }
            });
        });
    }

    /// Scroll handler for the list container: within 100px of the end,
    /// with more pages known and no fetch in flight, advance the cursor.
    pub fn handle_scroll(&self, ev: &web_sys::Event) {
        let Some(target) = ev.target() else {
            return;
        };
        let Ok(el) = target.dyn_into::<web_sys::Element>() else {
            return;
        };
        let metrics = ScrollMetrics {
            scroll_top: el.scroll_top(),
            scroll_height: el.scroll_height(),
            client_height: el.client_height(),
        };
        let next = self.state.update_untracked(|state| {
            state.wants_more(metrics).then(|| state.advance_page())
        });
        if let Some(page) = next {
            self.page.set(page);
        }
    }
}
