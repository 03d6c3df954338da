//! The ingest engine: turns validated subscribers into stored ones.
//!
//! Every record first has its inline location resolved through get-or-create, so repeated
//! (city, state) pairs collapse onto one stored location. A single record is then written on its
//! own; a batch is written with one bulk insert once every record in it has been resolved.

use crate::domain::{NewSubscriber, ResolvedSubscriber, Subscriber};
use crate::store::{LocationStore, StoreError, SubscriberStore};
use crate::utils::error_chain_fmt;
use std::time::{Duration, Instant};

#[derive(thiserror::Error)]
pub enum IngestError {
    #[error("No location input found")]
    MissingLocation,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl std::fmt::Debug for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Swaps the inline location of `subscriber` for a stored one, creating it if needed.
///
/// A record carrying neither a city nor a state is refused before the store is touched.
#[tracing::instrument(
    name = "Resolving subscriber location",
    skip(store, subscriber),
    fields(subscriber_email = %subscriber.email)
)]
pub async fn resolve_location<S>(
    store: &S,
    subscriber: NewSubscriber,
) -> Result<ResolvedSubscriber, IngestError>
where
    S: LocationStore,
{
    let (city, state) = match (&subscriber.location.city, &subscriber.location.state) {
        (Some(city), Some(state)) => (city.as_ref(), state.as_ref()),
        // Half a location never makes it past the validator; treat it like no location at all.
        _ => return Err(IngestError::MissingLocation),
    };
    let (location, created) = store.get_or_create_location(city, state).await?;
    if created {
        tracing::info!(location.id = %location.id, "Created a new location");
    }
    Ok(subscriber.resolved_with(location))
}

/// Resolves and immediately persists a single subscriber.
#[tracing::instrument(name = "Creating a subscriber", skip(store, subscriber))]
pub async fn create_one<S>(store: &S, subscriber: NewSubscriber) -> Result<Subscriber, IngestError>
where
    S: LocationStore + SubscriberStore,
{
    let resolved = resolve_location(store, subscriber).await?;
    Ok(store.insert_subscriber(resolved).await?)
}

/// Resolves every subscriber in order, then persists all of them with one bulk insert.
///
/// A failure while resolving any record aborts the batch before anything is inserted. Locations
/// created for earlier records are kept.
#[tracing::instrument(
    name = "Creating a batch of subscribers",
    skip(store, subscribers),
    fields(batch_size = subscribers.len())
)]
pub async fn create_batch<S>(
    store: &S,
    subscribers: Vec<NewSubscriber>,
) -> Result<Vec<Subscriber>, IngestError>
where
    S: LocationStore + SubscriberStore,
{
    let mut batch = BatchBuilder::with_capacity(subscribers.len());
    for subscriber in subscribers {
        batch.resolve(store, subscriber).await?;
    }
    batch.commit(store).await
}

/// Two-phase batch writer: `resolve` records one at a time, then `commit` them all at once.
///
/// Resolution is strictly sequential, each get-or-create call sees the locations created by the
/// calls before it, which is what lets two records with the same pair share one location.
#[derive(Debug, Default)]
pub struct BatchBuilder {
    resolved: Vec<ResolvedSubscriber>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            resolved: Vec::with_capacity(capacity),
        }
    }

    pub async fn resolve<S>(&mut self, store: &S, subscriber: NewSubscriber) -> Result<(), IngestError>
    where
        S: LocationStore,
    {
        let resolved = resolve_location(store, subscriber).await?;
        self.resolved.push(resolved);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Issues exactly one bulk insert with everything resolved so far.
    pub async fn commit<S>(self, store: &S) -> Result<Vec<Subscriber>, IngestError>
    where
        S: SubscriberStore,
    {
        Ok(store.bulk_insert_subscribers(self.resolved).await?)
    }
}

/// How long an ingest run took, for comparing the one-by-one and bulk paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestTiming {
    pub records: usize,
    pub elapsed: Duration,
}

impl IngestTiming {
    /// Runs `ingest`, which reports how many records it added, and measures it.
    pub async fn measure<F, E>(ingest: F) -> Result<Self, E>
    where
        F: std::future::Future<Output = Result<usize, E>>,
    {
        let start = Instant::now();
        let records = ingest.await?;
        Ok(Self {
            records,
            elapsed: start.elapsed(),
        })
    }
}

impl std::fmt::Display for IngestTiming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} items added in {} seconds",
            self.records,
            self.elapsed.as_secs_f64()
        )
    }
}
