use crate::domain::{SubscriberPayload, ValidatedPayload};
use crate::ingest;
use crate::routes::SubscriberError;
use crate::store::PgStore;
use actix_web::{web, HttpResponse};

/// `POST /subscribers`: a JSON object creates one subscriber, a JSON array creates all of them in
/// one go. Any other JSON value is refused.
#[tracing::instrument(name = "Adding subscribers", skip(body, store))]
pub async fn create_subscribers(
    body: web::Json<serde_json::Value>,
    store: web::Data<PgStore>,
) -> Result<HttpResponse, SubscriberError> {
    let payload = SubscriberPayload::try_from(body.into_inner())?;
    match payload.validate()? {
        ValidatedPayload::Single(subscriber) => {
            let created = ingest::create_one(store.get_ref(), subscriber).await?;
            Ok(HttpResponse::Created().json(created))
        }
        ValidatedPayload::Batch(subscribers) => {
            let created = ingest::create_batch(store.get_ref(), subscribers).await?;
            Ok(HttpResponse::Created().json(created))
        }
    }
}
