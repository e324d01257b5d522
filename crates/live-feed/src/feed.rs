//! Paged-fetch + push reconciler
//!
//! The collection invariant is id uniqueness. Ordering is insertion order;
//! updates always replace in place and never move an item.

use std::collections::HashMap;

use crate::scroll::ScrollMetrics;

/// Contract for items a feed can reconcile
pub trait Key: Clone {
    /// The type of the item's unique identifier
    type Id: Copy + Eq + std::hash::Hash;

    /// Returns the item's unique identifier
    fn key(&self) -> Self::Id;
}

/// Where a push upsert places an id not yet in the collection.
/// Ids already present are replaced in place under either policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertPolicy {
    /// New items go to the end
    Append,
    /// New items go to the front (most-recent-first lists)
    Front,
}

/// Incremental change delivered by the push channel
#[derive(Clone, Debug)]
pub enum FeedEvent<T: Key> {
    Upsert(T),
    Remove(T::Id),
}

/// Snapshot identifying one in-flight page fetch. A ticket issued before a
/// reset no longer matches the feed's generation and its response is
/// discarded whole.
#[derive(Clone, Copy, Debug)]
pub struct FetchTicket {
    page: u32,
    generation: u64,
    seq: u64,
}

impl FetchTicket {
    /// Page this ticket was issued for
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Client-side mirror of a paginated remote collection
pub struct PagedFeed<T: Key> {
    items: Vec<T>,
    page: u32,
    has_more: bool,
    loading: bool,
    generation: u64,
    seq: u64,
    policy: UpsertPolicy,
    /// Ids removed by push events, keyed to the sequence number of the
    /// removal. A fetched record whose id was removed after the fetch
    /// ticket was issued is skipped during the merge.
    removed: HashMap<T::Id, u64>,
}

impl<T: Key> PagedFeed<T> {
    pub fn new(policy: UpsertPolicy) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            has_more: false,
            loading: false,
            generation: 0,
            seq: 0,
            policy,
            removed: HashMap::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn policy(&self) -> UpsertPolicy {
        self.policy
    }

    /// Clear the collection and return the cursor to page 1. Outstanding
    /// fetches become stale; their eventual responses are discarded.
    pub fn reset(&mut self) {
        self.items.clear();
        self.page = 1;
        self.has_more = false;
        self.loading = false;
        self.generation += 1;
        self.removed.clear();
    }

    /// Mark a fetch in flight for the current page
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.loading = true;
        FetchTicket {
            page: self.page,
            generation: self.generation,
            seq: self.seq,
        }
    }

    /// Merge a fetched page by identifier: existing id replaces in place,
    /// new id appends. Returns false when the ticket is stale and nothing
    /// was merged.
    pub fn absorb_page(&mut self, ticket: FetchTicket, records: Vec<T>, has_more: bool) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "discarding stale page {} (generation {} behind {})",
                ticket.page,
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.loading = false;
        self.has_more = has_more;
        for record in records {
            let id = record.key();
            if self.removed.get(&id).is_some_and(|&at| at > ticket.seq) {
                log::debug!("skipping record removed while page {} was in flight", ticket.page);
                continue;
            }
            match self.items.iter_mut().find(|item| item.key() == id) {
                Some(slot) => *slot = record,
                None => self.items.push(record),
            }
        }
        // Tombstones at or before this ticket's sequence can never match a
        // later ticket, whose snapshot is at least as recent.
        self.removed.retain(|_, at| *at > ticket.seq);
        true
    }

    /// The fetch for this ticket failed; the collection keeps its
    /// last-known-good state.
    pub fn fetch_failed(&mut self, ticket: FetchTicket) {
        if ticket.generation == self.generation {
            self.loading = false;
        }
    }

    /// Apply one push event. Upserting an absent id inserts at the policy
    /// position; a present id is replaced without moving. Removing an
    /// absent id is a no-op.
    pub fn apply(&mut self, event: FeedEvent<T>) {
        match event {
            FeedEvent::Upsert(record) => {
                let id = record.key();
                self.removed.remove(&id);
                match self.items.iter_mut().find(|item| item.key() == id) {
                    Some(slot) => *slot = record,
                    None => match self.policy {
                        UpsertPolicy::Append => self.items.push(record),
                        UpsertPolicy::Front => self.items.insert(0, record),
                    },
                }
            }
            FeedEvent::Remove(id) => {
                self.seq += 1;
                self.removed.insert(id, self.seq);
                self.items.retain(|item| item.key() != id);
            }
        }
    }

    /// Advance the page cursor; the caller schedules the load
    pub fn advance_page(&mut self) -> u32 {
        self.page += 1;
        self.page
    }

    /// True when the viewport is near the end of the list, no fetch is in
    /// flight, and the server reported more pages.
    pub fn wants_more(&self, metrics: ScrollMetrics) -> bool {
        self.has_more && !self.loading && metrics.near_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: u32,
        body: String,
    }

    impl Key for Row {
        type Id = u32;

        fn key(&self) -> u32 {
            self.id
        }
    }

    fn row(id: u32, body: &str) -> Row {
        Row {
            id,
            body: body.to_string(),
        }
    }

    fn ids(feed: &PagedFeed<Row>) -> Vec<u32> {
        feed.items().iter().map(|r| r.id).collect()
    }

    fn absorb(feed: &mut PagedFeed<Row>, records: Vec<Row>, has_more: bool) {
        let ticket = feed.begin_fetch();
        assert!(feed.absorb_page(ticket, records, has_more));
    }

    #[test]
    fn test_fetch_merges_keep_ids_unique() {
        let mut feed = PagedFeed::new(UpsertPolicy::Append);
        absorb(&mut feed, vec![row(1, "a"), row(2, "b")], true);
        // Overlapping page: 2 already present, 3 is new
        absorb(&mut feed, vec![row(2, "b2"), row(3, "c")], false);
        assert_eq!(ids(&feed), vec![1, 2, 3]);
        assert_eq!(feed.items()[1].body, "b2");
        assert!(!feed.has_more());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut feed = PagedFeed::new(UpsertPolicy::Append);
        absorb(&mut feed, vec![row(1, "a")], false);
        feed.apply(FeedEvent::Remove(9));
        assert_eq!(ids(&feed), vec![1]);
    }

    #[test]
    fn test_upsert_absent_inserts_present_replaces() {
        let mut feed = PagedFeed::new(UpsertPolicy::Append);
        absorb(&mut feed, vec![row(1, "a"), row(2, "b")], false);

        feed.apply(FeedEvent::Upsert(row(3, "c")));
        assert_eq!(ids(&feed), vec![1, 2, 3]);

        feed.apply(FeedEvent::Upsert(row(1, "a2")));
        assert_eq!(ids(&feed), vec![1, 2, 3]);
        assert_eq!(feed.items()[0].body, "a2");
    }

    #[test]
    fn test_front_policy_inserts_new_first_but_never_moves_updates() {
        let mut feed = PagedFeed::new(UpsertPolicy::Front);
        absorb(&mut feed, vec![row(1, "a"), row(2, "b")], false);

        feed.apply(FeedEvent::Upsert(row(3, "c")));
        assert_eq!(ids(&feed), vec![3, 1, 2]);

        feed.apply(FeedEvent::Upsert(row(2, "b2")));
        assert_eq!(ids(&feed), vec![3, 1, 2]);
        assert_eq!(feed.items()[2].body, "b2");
    }

    #[test]
    fn test_reset_clears_items_and_rewinds_cursor() {
        let mut feed = PagedFeed::new(UpsertPolicy::Append);
        absorb(&mut feed, vec![row(1, "a")], true);
        feed.advance_page();
        assert_eq!(feed.page(), 2);

        feed.reset();
        assert!(feed.is_empty());
        assert_eq!(feed.page(), 1);
        assert!(!feed.has_more());
        assert!(!feed.loading());
    }

    #[test]
    fn test_fetch_then_push_then_next_page() {
        let mut feed = PagedFeed::new(UpsertPolicy::Append);
        absorb(&mut feed, vec![row(1, "a"), row(2, "b")], true);
        assert_eq!(ids(&feed), vec![1, 2]);

        feed.apply(FeedEvent::Upsert(row(2, "b2")));
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.items()[1].body, "b2");

        feed.apply(FeedEvent::Remove(1));
        assert_eq!(ids(&feed), vec![2]);

        feed.advance_page();
        absorb(&mut feed, vec![row(3, "c")], false);
        assert_eq!(ids(&feed), vec![2, 3]);
    }

    #[test]
    fn test_stale_response_discarded_after_reset() {
        let mut feed = PagedFeed::new(UpsertPolicy::Append);
        let ticket = feed.begin_fetch();
        feed.reset();

        assert!(!feed.absorb_page(ticket, vec![row(1, "late")], true));
        assert!(feed.is_empty());
        assert!(!feed.has_more());
    }

    #[test]
    fn test_remove_during_fetch_is_not_resurrected() {
        let mut feed = PagedFeed::new(UpsertPolicy::Append);
        absorb(&mut feed, vec![row(1, "a"), row(2, "b")], true);

        let ticket = feed.begin_fetch();
        feed.apply(FeedEvent::Remove(1));
        assert!(feed.absorb_page(ticket, vec![row(1, "a"), row(3, "c")], false));
        assert_eq!(ids(&feed), vec![2, 3]);
    }

    #[test]
    fn test_remove_before_fetch_defers_to_server() {
        let mut feed = PagedFeed::new(UpsertPolicy::Append);
        absorb(&mut feed, vec![row(1, "a")], true);
        feed.apply(FeedEvent::Remove(1));

        // The next fetch starts after the removal, so the server's view of
        // id 1 is authoritative again.
        absorb(&mut feed, vec![row(1, "a2")], false);
        assert_eq!(ids(&feed), vec![1]);
        assert_eq!(feed.items()[0].body, "a2");
    }

    #[test]
    fn test_upsert_clears_pending_tombstone() {
        let mut feed = PagedFeed::new(UpsertPolicy::Append);
        absorb(&mut feed, vec![row(1, "a")], true);

        let ticket = feed.begin_fetch();
        feed.apply(FeedEvent::Remove(1));
        feed.apply(FeedEvent::Upsert(row(1, "back")));
        assert!(feed.absorb_page(ticket, vec![row(1, "fetched")], false));
        assert_eq!(ids(&feed), vec![1]);
        assert_eq!(feed.items()[0].body, "fetched");
    }

    #[test]
    fn test_fetch_failed_clears_loading_for_current_generation_only() {
        let mut feed: PagedFeed<Row> = PagedFeed::new(UpsertPolicy::Append);
        let stale = feed.begin_fetch();
        feed.reset();
        let current = feed.begin_fetch();
        assert!(feed.loading());

        feed.fetch_failed(stale);
        assert!(feed.loading());

        feed.fetch_failed(current);
        assert!(!feed.loading());
    }

    #[test]
    fn test_wants_more_requires_pages_idle_and_proximity() {
        let near = ScrollMetrics {
            scroll_top: 600,
            scroll_height: 1000,
            client_height: 400,
        };
        let far = ScrollMetrics {
            scroll_top: 0,
            scroll_height: 1000,
            client_height: 400,
        };

        let mut feed: PagedFeed<Row> = PagedFeed::new(UpsertPolicy::Append);
        assert!(!feed.wants_more(near));

        absorb(&mut feed, vec![row(1, "a")], true);
        assert!(feed.wants_more(near));
        assert!(!feed.wants_more(far));

        feed.begin_fetch();
        assert!(!feed.wants_more(near));
    }

    #[test]
    fn test_advance_page_increments_cursor() {
        let mut feed: PagedFeed<Row> = PagedFeed::new(UpsertPolicy::Append);
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.advance_page(), 2);
        assert_eq!(feed.page(), 2);
    }
}
