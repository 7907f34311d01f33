use crate::error::DbError;
use crate::search::{SearchQuery, SqlParam};
use crate::store::ListingStore;
use async_trait::async_trait;
use core_types::{GuestReservation, NewProperty, NewUser, Property, PropertyListing, User};
use sqlx::postgres::PgPool;

/// The `DbRepository` is the Postgres-backed `ListingStore`. It encapsulates
/// all SQL text and runs every statement on the shared connection pool.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ListingStore for DbRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn guest_reservations(
        &self,
        guest_id: i32,
        limit: u32,
    ) -> Result<Vec<GuestReservation>, DbError> {
        let reservations = sqlx::query_as::<_, GuestReservation>(
            r#"
            SELECT
                reservations.id, reservations.guest_id, reservations.property_id,
                reservations.start_date, reservations.end_date,
                properties.title, properties.cost_per_night,
                avg(property_reviews.rating) AS average_rating
            FROM
                reservations
            JOIN
                properties ON properties.id = reservations.property_id
            LEFT JOIN
                property_reviews ON property_reviews.property_id = properties.id
            WHERE
                reservations.guest_id = $1
            GROUP BY
                properties.id, reservations.id
            ORDER BY
                reservations.start_date, reservations.id
            LIMIT $2
            "#,
        )
        .bind(guest_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    async fn search_properties(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<PropertyListing>, DbError> {
        let (sql, params) = query.to_sql();
        tracing::debug!(sql = %sql, params = params.len(), limit = query.limit(), "Running property search.");

        let mut statement = sqlx::query_as::<_, PropertyListing>(&sql);
        for param in params {
            statement = match param {
                SqlParam::Text(text) => statement.bind(text),
                SqlParam::BigInt(number) => statement.bind(number),
                SqlParam::Numeric(decimal) => statement.bind(decimal),
            };
        }

        let listings = statement.fetch_all(&self.pool).await?;
        Ok(listings)
    }

    async fn insert_property(&self, property: &NewProperty) -> Result<Property, DbError> {
        let query = r#"
            INSERT INTO properties (
                owner_id, title, description, thumbnail_photo_url, cover_photo_url,
                cost_per_night, parking_spaces, number_of_bathrooms, number_of_bedrooms,
                country, street, city, province, post_code, active
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15
            )
            RETURNING *
            "#;

        let property = sqlx::query_as::<_, Property>(query)
            .bind(property.owner_id)
            .bind(&property.title)
            .bind(&property.description)
            .bind(&property.thumbnail_photo_url)
            .bind(&property.cover_photo_url)
            .bind(property.cost_per_night)
            .bind(property.parking_spaces)
            .bind(property.number_of_bathrooms)
            .bind(property.number_of_bedrooms)
            .bind(&property.country)
            .bind(&property.street)
            .bind(&property.city)
            .bind(&property.province)
            .bind(&property.post_code)
            .bind(property.active)
            .fetch_one(&self.pool)
            .await?;

        Ok(property)
    }
}
