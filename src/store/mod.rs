//! Persistence seams used by the ingest engine and the HTTP layer.
//!
//! The engine only ever talks to these traits; `PgStore` backs them with Postgres in production
//! and `InMemoryStore` with plain collections in unit tests.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use crate::domain::{Location, ResolvedSubscriber, Subscriber};
use crate::utils::error_chain_fmt;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::future::Future;
use uuid::Uuid;

/// Unique (city, state) pairs, handed out with get-or-create semantics.
pub trait LocationStore: Send + Sync {
    /// Returns the stored location for `(city, state)`, creating it if none exists yet. The flag
    /// tells whether this call created it.
    ///
    /// Deduplication is best-effort: two concurrent calls for a new pair may both create a row.
    fn get_or_create_location(
        &self,
        city: &str,
        state: &str,
    ) -> impl Future<Output = Result<(Location, bool), StoreError>> + Send;
}

/// Subscriber rows, each referencing an already stored `Location`.
pub trait SubscriberStore: Send + Sync {
    /// Persists one subscriber, assigning its id and creation time.
    fn insert_subscriber(
        &self,
        subscriber: ResolvedSubscriber,
    ) -> impl Future<Output = Result<Subscriber, StoreError>> + Send;

    /// Persists every subscriber in a single round trip. Results keep input order.
    fn bulk_insert_subscribers(
        &self,
        subscribers: Vec<ResolvedSubscriber>,
    ) -> impl Future<Output = Result<Vec<Subscriber>, StoreError>> + Send;

    /// All subscribers matching `filter`, oldest first.
    fn list_subscribers(
        &self,
        filter: SubscriberFilter,
    ) -> impl Future<Output = Result<Vec<Subscriber>, StoreError>> + Send;

    /// Removes a subscriber. Its location is left alone.
    fn delete_subscriber(&self, id: Uuid) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Parameters for [`SubscriberStore::list_subscribers`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberFilter {
    /// Case-insensitive substring the location's state must contain.
    pub state: Option<String>,
}

impl SubscriberFilter {
    pub fn matches(&self, subscriber: &Subscriber) -> bool {
        match &self.state {
            None => true,
            Some(needle) => subscriber
                .location
                .state
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

/// The current time truncated to microseconds, the precision `timestamptz` keeps, so what a write
/// returns is what a later read sees.
pub(crate) fn created_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Creation times for `count` rows written together, one microsecond apart in input order.
pub(crate) fn creation_times(count: usize) -> impl Iterator<Item = DateTime<Utc>> {
    let start = created_now();
    (0..count).map(move |offset| start + Duration::microseconds(offset as i64))
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Subscriber {0} does not exist")]
    SubscriberNotFound(Uuid),
    #[error("Failed to perform a database operation")]
    Database(#[from] sqlx::Error),
    #[error("The in-memory store is unusable: {0}")]
    Poisoned(String),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
