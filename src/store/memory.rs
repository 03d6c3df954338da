use crate::domain::{Location, ResolvedSubscriber, Subscriber};
use crate::store::{
    created_now, creation_times, LocationStore, StoreError, SubscriberFilter, SubscriberStore,
};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// A process-local store, useful for testing the ingest engine without a database.
///
/// It counts the writes it receives so tests can tell a bulk insert from a loop of single inserts.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    locations: Vec<Location>,
    subscribers: Vec<Subscriber>,
    single_inserts: usize,
    bulk_inserts: usize,
    /// Makes every subscriber write fail from now on, to exercise error paths.
    fail_writes: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    pub fn fail_writes(&self) {
        if let Ok(mut state) = self.state() {
            state.fail_writes = true;
        }
    }

    pub fn locations(&self) -> Vec<Location> {
        self.state()
            .map(|state| state.locations.clone())
            .unwrap_or_default()
    }

    pub fn subscribers(&self) -> Vec<Subscriber> {
        self.state()
            .map(|state| state.subscribers.clone())
            .unwrap_or_default()
    }

    /// `(single inserts, bulk inserts)` issued so far.
    pub fn write_calls(&self) -> (usize, usize) {
        self.state()
            .map(|state| (state.single_inserts, state.bulk_inserts))
            .unwrap_or_default()
    }
}

impl LocationStore for InMemoryStore {
    async fn get_or_create_location(
        &self,
        city: &str,
        state: &str,
    ) -> Result<(Location, bool), StoreError> {
        let mut inner = self.state()?;
        if let Some(location) = inner
            .locations
            .iter()
            .find(|l| l.city == city && l.state == state)
        {
            return Ok((location.clone(), false));
        }
        let location = Location {
            id: Uuid::new_v4(),
            city: city.to_owned(),
            state: state.to_owned(),
        };
        inner.locations.push(location.clone());
        Ok((location, true))
    }
}

impl SubscriberStore for InMemoryStore {
    async fn insert_subscriber(
        &self,
        subscriber: ResolvedSubscriber,
    ) -> Result<Subscriber, StoreError> {
        let mut state = self.state()?;
        state.single_inserts += 1;
        if state.fail_writes {
            return Err(StoreError::Poisoned("writes are disabled".into()));
        }
        let subscriber = Subscriber::from_resolved(Uuid::new_v4(), created_now(), subscriber);
        state.subscribers.push(subscriber.clone());
        Ok(subscriber)
    }

    async fn bulk_insert_subscribers(
        &self,
        subscribers: Vec<ResolvedSubscriber>,
    ) -> Result<Vec<Subscriber>, StoreError> {
        let mut state = self.state()?;
        state.bulk_inserts += 1;
        if state.fail_writes {
            return Err(StoreError::Poisoned("writes are disabled".into()));
        }
        let count = subscribers.len();
        let subscribers: Vec<_> = subscribers
            .into_iter()
            .zip(creation_times(count))
            .map(|(s, created)| Subscriber::from_resolved(Uuid::new_v4(), created, s))
            .collect();
        state.subscribers.extend(subscribers.iter().cloned());
        Ok(subscribers)
    }

    async fn list_subscribers(
        &self,
        filter: SubscriberFilter,
    ) -> Result<Vec<Subscriber>, StoreError> {
        let mut subscribers: Vec<_> = self
            .state()?
            .subscribers
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        subscribers.sort_by_key(|s| (s.created, s.id));
        Ok(subscribers)
    }

    async fn delete_subscriber(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let before = state.subscribers.len();
        state.subscribers.retain(|s| s.id != id);
        if state.subscribers.len() == before {
            return Err(StoreError::SubscriberNotFound(id));
        }
        Ok(())
    }
}
