use crate::domain::field_errors::{NOT_A_STRING, NOT_NULL, REQUIRED};
use crate::domain::{
    FieldErrors, LocationCity, LocationState, NewLocation, NewSubscriber, SubscriberEmail,
    SubscriberGender, SubscriberName, ValidationErrors,
};
use serde_json::{Map, Value};

/// The body of `POST /subscribers`, classified once at the boundary: a single JSON object or a
/// JSON array of them. Everything downstream matches on this instead of poking at raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriberPayload {
    Single(Map<String, Value>),
    Batch(Vec<Value>),
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid data received")]
pub struct PayloadShapeError;

impl TryFrom<Value> for SubscriberPayload {
    type Error = PayloadShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(record) => Ok(Self::Single(record)),
            Value::Array(records) => Ok(Self::Batch(records)),
            _ => Err(PayloadShapeError),
        }
    }
}

/// A payload whose every record passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedPayload {
    Single(NewSubscriber),
    Batch(Vec<NewSubscriber>),
}

impl SubscriberPayload {
    pub fn validate(self) -> Result<ValidatedPayload, ValidationErrors> {
        match self {
            Self::Single(record) => validate_record(&record)
                .map(ValidatedPayload::Single)
                .map_err(ValidationErrors::Record),
            Self::Batch(records) => validate_batch(&records)
                .map(ValidatedPayload::Batch)
                .map_err(|subscribers| ValidationErrors::Batch { subscribers }),
        }
    }
}

/// Checks a single record against the subscriber schema.
pub fn validate_record(record: &Map<String, Value>) -> Result<NewSubscriber, FieldErrors> {
    let mut errors = FieldErrors::default();

    let first_name = required_text(record, "first_name", SubscriberName::parse, &mut errors);
    let last_name = required_text(record, "last_name", SubscriberName::parse, &mut errors);
    let email = required_text(record, "email", SubscriberEmail::parse, &mut errors);
    let gender = required_text(record, "gender", SubscriberGender::parse, &mut errors);
    let location = location_field(record, &mut errors);

    match (first_name, last_name, email, gender, location) {
        (Some(first_name), Some(last_name), Some(email), Some(gender), Some(location))
            if errors.is_empty() =>
        {
            Ok(NewSubscriber {
                first_name,
                last_name,
                email,
                gender,
                location,
            })
        }
        _ => Err(errors),
    }
}

/// Checks every record of a batch. A single bad record rejects the whole batch; the returned
/// errors line up with the input, one entry per record.
pub fn validate_batch(records: &[Value]) -> Result<Vec<NewSubscriber>, Vec<FieldErrors>> {
    let outcomes: Vec<_> = records
        .iter()
        .map(|record| match record {
            Value::Object(record) => validate_record(record),
            other => Err(FieldErrors::non_field(expected_a_dictionary(other))),
        })
        .collect();

    if outcomes.iter().all(Result::is_ok) {
        Ok(outcomes.into_iter().filter_map(Result::ok).collect())
    } else {
        Err(outcomes
            .into_iter()
            .map(|outcome| outcome.err().unwrap_or_default())
            .collect())
    }
}

fn required_text<T>(
    record: &Map<String, Value>,
    field: &'static str,
    parse: impl FnOnce(String) -> Result<T, String>,
    errors: &mut FieldErrors,
) -> Option<T> {
    match record.get(field) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::Null) => {
            errors.add(field, NOT_NULL);
            None
        }
        Some(Value::String(s)) => parse(s.clone())
            .map_err(|message| errors.add(field, message))
            .ok(),
        Some(_) => {
            errors.add(field, NOT_A_STRING);
            None
        }
    }
}

/// Like `required_text`, except that a missing, null or blank value is simply absent.
fn optional_text<T>(
    record: &Map<String, Value>,
    field: &'static str,
    parse: impl FnOnce(String) -> Result<T, String>,
    errors: &mut FieldErrors,
) -> Option<T> {
    match record.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => parse(s.clone())
            .map_err(|message| errors.add(field, message))
            .ok(),
        Some(_) => {
            errors.add(field, NOT_A_STRING);
            None
        }
    }
}

fn location_field(record: &Map<String, Value>, errors: &mut FieldErrors) -> Option<NewLocation> {
    match record.get("location") {
        None => {
            errors.add("location", REQUIRED);
            None
        }
        Some(Value::Null) => {
            errors.add("location", NOT_NULL);
            None
        }
        Some(Value::Object(location)) => validate_location(location)
            .map_err(|location_errors| errors.nest("location", location_errors))
            .ok(),
        Some(other) => {
            errors.nest("location", FieldErrors::non_field(expected_a_dictionary(other)));
            None
        }
    }
}

/// Validates the nested location sub-record.
///
/// City and state are length-checked on their own, while presence is decided for the pair: one
/// without the other is reported here, neither at all is let through for the ingest engine to
/// refuse.
pub fn validate_location(location: &Map<String, Value>) -> Result<NewLocation, FieldErrors> {
    let mut errors = FieldErrors::default();
    let city = optional_text(location, "city", LocationCity::parse, &mut errors);
    let state = optional_text(location, "state", LocationState::parse, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    match (&city, &state) {
        (Some(_), None) => errors.add("state", REQUIRED),
        (None, Some(_)) => errors.add("city", REQUIRED),
        _ => {}
    }
    if errors.is_empty() {
        Ok(NewLocation { city, state })
    } else {
        Err(errors)
    }
}

fn expected_a_dictionary(value: &Value) -> String {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("Invalid data. Expected a dictionary, but got {kind}.")
}
