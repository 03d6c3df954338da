use crate::domain::{Location, NewLocation, SubscriberEmail, SubscriberGender, SubscriberName};

/// A subscriber that passed validation but has not been written anywhere yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscriber {
    pub first_name: SubscriberName,
    pub last_name: SubscriberName,
    pub email: SubscriberEmail,
    pub gender: SubscriberGender,
    pub location: NewLocation,
}

/// A `NewSubscriber` whose inline location has been swapped for a reference to a stored
/// `Location`. This is what the subscriber store persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubscriber {
    pub first_name: SubscriberName,
    pub last_name: SubscriberName,
    pub email: SubscriberEmail,
    pub gender: SubscriberGender,
    pub location: Location,
}

impl NewSubscriber {
    pub fn resolved_with(self, location: Location) -> ResolvedSubscriber {
        ResolvedSubscriber {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            gender: self.gender,
            location,
        }
    }
}
