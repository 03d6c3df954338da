use crate::domain::BoundedText;
use uuid::Uuid;

pub type LocationCity = BoundedText<256>;
pub type LocationState = BoundedText<64>;

/// The location sub-record of an incoming subscriber, before it has been resolved against the
/// store.
///
/// Both halves are optional here: the validator rejects a record carrying only one of them, while
/// a record carrying neither is left for the ingest engine to refuse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLocation {
    pub city: Option<LocationCity>,
    pub state: Option<LocationState>,
}

/// A stored (city, state) pair. Many subscribers may point at the same location; a location
/// outlives all of them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
pub struct Location {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub city: String,
    pub state: String,
}
