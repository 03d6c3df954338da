mod bounded_text;
pub mod field_errors;
mod location;
mod new_subscriber;
mod payload;
mod subscriber;
mod subscriber_email;

pub use bounded_text::BoundedText;
pub use field_errors::{FieldError, FieldErrors, ValidationErrors};
pub use location::{Location, LocationCity, LocationState, NewLocation};
pub use new_subscriber::{NewSubscriber, ResolvedSubscriber};
pub use payload::{
    validate_batch, validate_location, validate_record, PayloadShapeError, SubscriberPayload,
    ValidatedPayload,
};
pub use subscriber::Subscriber;
pub use subscriber_email::SubscriberEmail;

pub type SubscriberName = BoundedText<64>;
pub type SubscriberGender = BoundedText<8>;
