use crate::routes::SubscriberError;
use crate::store::{PgStore, SubscriberStore};
use actix_web::{web, HttpResponse};
use uuid::Uuid;

#[tracing::instrument(name = "Deleting a subscriber", skip(store))]
pub async fn delete_subscriber(
    id: web::Path<Uuid>,
    store: web::Data<PgStore>,
) -> Result<HttpResponse, SubscriberError> {
    store.delete_subscriber(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
