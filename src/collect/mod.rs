//! Windowed collection of repository metadata from the GitHub search API
//!
//! The search API only ever returns the first thousand results of a query, so collection
//! works on creation-date windows. A window whose total result count is too large to page
//! through completely is bisected until its halves fit, or until it covers a single day.
//!
//! # Pieces
//!
//! - [`DateWindow`], [`month_windows`], [`random_windows`]: the date ranges being searched
//! - [`SearchClient`]: the HTTP client, retrying rate limits and server errors with backoff
//! - [`WindowScheduler`]: the depth-first queue driving probes, splits and paging
//! - [`ResultDeduplicator`]: drops repositories already collected from an earlier window

mod client;
mod credentials;
mod dedup;
mod progress;
mod query;
mod rate_limit;
mod scheduler;
mod window;

pub use client::{
    License, Owner, RetryPolicy, SearchClient, SearchError, SearchHit, SearchPage, SearchSource, backoff_delay,
};
pub use credentials::{load_token, token_from};
pub use dedup::ResultDeduplicator;
pub use progress::Progress;
pub use query::SearchQuery;
pub use rate_limit::{RateLimitOverview, RateLimitResource, RateLimitResources, mask_token};
pub use scheduler::{Collection, CollectionStats, SchedulerSettings, WindowScheduler, plan_windows};
pub use window::{DateWindow, month_windows, random_windows};
