use crate::domain::{Location, ResolvedSubscriber, Subscriber};
use crate::store::{
    created_now, creation_times, LocationStore, StoreError, SubscriberFilter, SubscriberStore,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Both stores on top of a Postgres connection pool.
///
/// Cloning is cheap, `PgPool` is reference-counted.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SubscriberRow {
    id: Uuid,
    created: DateTime<Utc>,
    first_name: String,
    last_name: String,
    email: String,
    gender: String,
    location_id: Uuid,
    city: String,
    state: String,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Subscriber {
            id: row.id,
            created: row.created,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            gender: row.gender,
            location: Location {
                id: row.location_id,
                city: row.city,
                state: row.state,
            },
        }
    }
}

impl LocationStore for PgStore {
    #[tracing::instrument(name = "Get or create location", skip(self))]
    async fn get_or_create_location(
        &self,
        city: &str,
        state: &str,
    ) -> Result<(Location, bool), StoreError> {
        // No unique constraint backs this lookup: two requests racing on a brand-new pair can
        // both miss here and both insert.
        let existing = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, city, state FROM locations
            WHERE city = $1 AND state = $2
            LIMIT 1
            "#,
        )
        .bind(city)
        .bind(state)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;

        if let Some(location) = existing {
            return Ok((location, false));
        }

        let location = Location {
            id: Uuid::new_v4(),
            city: city.to_owned(),
            state: state.to_owned(),
        };
        sqlx::query(
            r#"
            INSERT INTO locations (id, city, state)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(location.id)
        .bind(&location.city)
        .bind(&location.state)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;

        Ok((location, true))
    }
}

impl SubscriberStore for PgStore {
    #[tracing::instrument(
        name = "Saving new subscriber details in the database",
        skip(self, subscriber),
        fields(subscriber_email = %subscriber.email)
    )]
    async fn insert_subscriber(
        &self,
        subscriber: ResolvedSubscriber,
    ) -> Result<Subscriber, StoreError> {
        let subscriber = Subscriber::from_resolved(Uuid::new_v4(), created_now(), subscriber);
        sqlx::query(
            r#"
            INSERT INTO subscribers (id, created, first_name, last_name, email, gender, location_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(subscriber.id)
        .bind(subscriber.created)
        .bind(&subscriber.first_name)
        .bind(&subscriber.last_name)
        .bind(&subscriber.email)
        .bind(&subscriber.gender)
        .bind(subscriber.location.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;

        Ok(subscriber)
    }

    /// One `INSERT ... SELECT FROM UNNEST(...)` statement: a single round trip, and atomic since it
    /// is a single statement.
    #[tracing::instrument(
        name = "Bulk saving subscribers in the database",
        skip(self, subscribers),
        fields(batch_size = subscribers.len())
    )]
    async fn bulk_insert_subscribers(
        &self,
        subscribers: Vec<ResolvedSubscriber>,
    ) -> Result<Vec<Subscriber>, StoreError> {
        let count = subscribers.len();
        let subscribers: Vec<Subscriber> = subscribers
            .into_iter()
            .zip(creation_times(count))
            .map(|(s, created)| Subscriber::from_resolved(Uuid::new_v4(), created, s))
            .collect();

        let mut ids = Vec::with_capacity(subscribers.len());
        let mut created = Vec::with_capacity(subscribers.len());
        let mut first_names = Vec::with_capacity(subscribers.len());
        let mut last_names = Vec::with_capacity(subscribers.len());
        let mut emails = Vec::with_capacity(subscribers.len());
        let mut genders = Vec::with_capacity(subscribers.len());
        let mut location_ids = Vec::with_capacity(subscribers.len());
        for subscriber in &subscribers {
            ids.push(subscriber.id);
            created.push(subscriber.created);
            first_names.push(subscriber.first_name.clone());
            last_names.push(subscriber.last_name.clone());
            emails.push(subscriber.email.clone());
            genders.push(subscriber.gender.clone());
            location_ids.push(subscriber.location.id);
        }

        sqlx::query(
            r#"
            INSERT INTO subscribers (id, created, first_name, last_name, email, gender, location_id)
            SELECT * FROM UNNEST(
                $1::uuid[], $2::timestamptz[], $3::text[], $4::text[], $5::text[], $6::text[], $7::uuid[]
            )
            "#,
        )
        .bind(ids)
        .bind(created)
        .bind(first_names)
        .bind(last_names)
        .bind(emails)
        .bind(genders)
        .bind(location_ids)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;

        Ok(subscribers)
    }

    #[tracing::instrument(name = "List subscribers", skip(self))]
    async fn list_subscribers(
        &self,
        filter: SubscriberFilter,
    ) -> Result<Vec<Subscriber>, StoreError> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            r#"
            SELECT s.id, s.created, s.first_name, s.last_name, s.email, s.gender,
                   l.id AS location_id, l.city, l.state
            FROM subscribers s
            JOIN locations l ON l.id = s.location_id
            WHERE $1::text IS NULL OR strpos(lower(l.state), lower($1)) > 0
            ORDER BY s.created ASC, s.id ASC
            "#,
        )
        .bind(filter.state)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            e
        })?;

        Ok(rows.into_iter().map(Subscriber::from).collect())
    }

    #[tracing::instrument(name = "Delete subscriber", skip(self))]
    async fn delete_subscriber(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(r#"DELETE FROM subscribers WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to execute query: {:?}", e);
                e
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::SubscriberNotFound(id));
        }
        Ok(())
    }
}
