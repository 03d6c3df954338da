use std::collections::BTreeMap;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation failures of a single record, keyed by field name.
///
/// Serialises to `{"first_name": ["..."], "location": {"city": ["..."]}}`; nested sub-records
/// (e.g. `location`) report their own errors as a nested object.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, FieldError>);

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldError {
    Messages(Vec<String>),
    Nested(FieldErrors),
}

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        let entry = self
            .0
            .entry(field)
            .or_insert_with(|| FieldError::Messages(Vec::new()));
        if let FieldError::Messages(messages) = entry {
            messages.push(message.into());
        }
    }

    pub fn nest(&mut self, field: &'static str, errors: FieldErrors) {
        self.0.insert(field, FieldError::Nested(errors));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<_> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// What the validator hands back when a payload is rejected. A batch reports one entry per input
/// record under `subscribers`, in input order, with an empty object for records that were fine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    #[error("The subscriber record is not valid: {0}")]
    Record(FieldErrors),
    #[error("One or more subscriber records in the batch are not valid")]
    Batch { subscribers: Vec<FieldErrors> },
}
