use crate::routes::SubscriberError;
use crate::store::{PgStore, SubscriberFilter, SubscriberStore};
use actix_web::{web, HttpResponse};

/// The query parameters `GET /subscribers` understands. `actix-web` only calls the handler if the
/// query string deserialises into this struct.
#[derive(serde::Deserialize, Debug)]
pub struct ListParameters {
    state: Option<String>,
}

#[tracing::instrument(name = "Listing subscribers", skip(store))]
pub async fn list_subscribers(
    parameters: web::Query<ListParameters>,
    store: web::Data<PgStore>,
) -> Result<HttpResponse, SubscriberError> {
    let filter = SubscriberFilter {
        state: parameters.into_inner().state,
    };
    let subscribers = store.list_subscribers(filter).await?;
    Ok(HttpResponse::Ok().json(subscribers))
}
