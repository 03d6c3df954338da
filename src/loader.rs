//! Bulk test-data loading, shared by the `load_subscribers` binary.
//!
//! Test data comes either as CSV with a header row and the columns
//! `first_name, last_name, email, gender, city, state`, or as a JSON array of records shaped like
//! the `POST /subscribers` body. Both are turned into raw records and pushed through the same
//! validation and ingest path the API uses.

use crate::domain::{validate_batch, validate_record, FieldErrors};
use crate::ingest::{self, IngestError};
use crate::store::{LocationStore, StoreError, SubscriberStore};
use serde_json::{json, Value};
use std::io::Read;

/// One row of the CSV test data. Columns are read by position.
#[derive(Debug, serde::Deserialize)]
struct TestDataRow {
    first_name: String,
    last_name: String,
    email: String,
    gender: String,
    city: String,
    state: String,
}

impl From<TestDataRow> for Value {
    fn from(row: TestDataRow) -> Self {
        json!({
            "first_name": row.first_name,
            "last_name": row.last_name,
            "email": row.email,
            "gender": row.gender,
            "location": {"city": row.city, "state": row.state}
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TestDataError {
    #[error("Failed to read CSV test data")]
    Csv(#[from] csv::Error),
    #[error("Failed to read JSON test data")]
    Json(#[from] serde_json::Error),
    #[error("JSON test data must be an array of records")]
    NotAnArray,
}

/// Reads CSV test data, skipping the header row.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Value>, TestDataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in reader.records() {
        let row: TestDataRow = row?.deserialize(None)?;
        records.push(row.into());
    }
    Ok(records)
}

/// Reads a JSON array of records.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<Value>, TestDataError> {
    let value: Value = serde_json::from_reader(reader)?;
    match value {
        Value::Array(records) => Ok(records),
        _ => Err(TestDataError::NotAnArray),
    }
}

/// Adds the records one insert at a time. Invalid records, and records without a location, are
/// skipped with a warning. Returns how many were added.
#[tracing::instrument(
    name = "Adding test data one by one",
    skip(store, records),
    fields(records = records.len())
)]
pub async fn add_one_by_one<S>(store: &S, records: &[Value]) -> Result<usize, StoreError>
where
    S: LocationStore + SubscriberStore,
{
    let mut added = 0;
    for (index, record) in records.iter().enumerate() {
        let subscriber = match record {
            Value::Object(record) => validate_record(record),
            _ => Err(FieldErrors::non_field("Expected a JSON object")),
        };
        let subscriber = match subscriber {
            Ok(subscriber) => subscriber,
            Err(errors) => {
                tracing::warn!(index, %errors, "Skipping an invalid subscriber record");
                continue;
            }
        };
        match ingest::create_one(store, subscriber).await {
            Ok(_) => added += 1,
            Err(IngestError::MissingLocation) => {
                tracing::warn!(index, "Skipping a subscriber record without a location");
            }
            Err(IngestError::Store(e)) => return Err(e),
        }
    }
    Ok(added)
}

/// Adds the records with one bulk insert. All or nothing: a single invalid record, or one without
/// a location, means nothing is added. Returns how many were added.
#[tracing::instrument(
    name = "Adding test data in bulk",
    skip(store, records),
    fields(records = records.len())
)]
pub async fn add_in_bulk<S>(store: &S, records: &[Value]) -> Result<usize, StoreError>
where
    S: LocationStore + SubscriberStore,
{
    let subscribers = match validate_batch(records) {
        Ok(subscribers) => subscribers,
        Err(errors) => {
            let invalid = errors.iter().filter(|e| !e.is_empty()).count();
            tracing::warn!(invalid, "The batch holds invalid records, nothing was added");
            return Ok(0);
        }
    };
    match ingest::create_batch(store, subscribers).await {
        Ok(created) => Ok(created.len()),
        Err(IngestError::MissingLocation) => {
            tracing::warn!("A record in the batch has no location, nothing was added");
            Ok(0)
        }
        Err(IngestError::Store(e)) => Err(e),
    }
}
