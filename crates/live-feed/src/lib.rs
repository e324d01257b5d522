//! Live Feed Reconciliation
//!
//! Keeps a client-side list consistent with a paginated remote listing plus
//! a push event stream. One merge policy for every list, generation-counted
//! fetches so superseded responses are discarded instead of merged.

mod feed;
mod scroll;

pub use feed::{FeedEvent, FetchTicket, Key, PagedFeed, UpsertPolicy};
pub use scroll::{ScrollMetrics, LOAD_AHEAD_PX};
