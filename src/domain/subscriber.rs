use crate::domain::{Location, ResolvedSubscriber};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted subscriber, as returned to API clients:
/// `{id, created, first_name, last_name, email, gender, location: {city, state}}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub location: Location,
}

impl Subscriber {
    /// Stamps a resolved record with the identity and creation time the store assigned to it.
    pub fn from_resolved(id: Uuid, created: DateTime<Utc>, resolved: ResolvedSubscriber) -> Self {
        Self {
            id,
            created,
            first_name: resolved.first_name.into_inner(),
            last_name: resolved.last_name.into_inner(),
            email: resolved.email.into_inner(),
            gender: resolved.gender.into_inner(),
            location: resolved.location,
        }
    }
}
