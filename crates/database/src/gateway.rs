use crate::error::DbError;
use crate::search::SearchQuery;
use crate::store::ListingStore;
use configuration::GatewaySettings;
use core_types::{
    GuestReservation, NewProperty, NewUser, Property, PropertyListing, PropertySearch, User,
};

/// The query gateway: the single entry point the rest of the application
/// uses to read and write listing data.
///
/// It is built over an explicit store handle, applies the configured default
/// row limit, and turns lookup misses into `DbError::NotFound`. Failures are
/// returned to the caller untouched; logging them is the caller's business.
#[derive(Debug, Clone)]
pub struct QueryGateway<S> {
    store: S,
    settings: GatewaySettings,
}

impl<S: ListingStore> QueryGateway<S> {
    pub fn new(store: S, settings: GatewaySettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn limit_or_default(&self, limit: Option<u32>) -> u32 {
        limit.unwrap_or(self.settings.default_limit)
    }

    /// Looks up one user by exact, case-sensitive email.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_user_with_email(&self, email: &str) -> Result<User, DbError> {
        self.store
            .find_user_by_email(email)
            .await?
            .ok_or(DbError::NotFound)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_user_with_id(&self, id: i32) -> Result<User, DbError> {
        self.store.find_user_by_id(id).await?.ok_or(DbError::NotFound)
    }

    /// Creates a user. The password is stored as given. A duplicate email
    /// comes back as `DbError::ConstraintViolation`.
    #[tracing::instrument(level = "debug", skip(self, user), fields(email = %user.email))]
    pub async fn add_user(&self, user: &NewUser) -> Result<User, DbError> {
        self.store.insert_user(user).await
    }

    /// A guest's reservations, enriched with the property's title, nightly
    /// cost and mean rating, earliest start first, at most `limit` rows.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_all_reservations(
        &self,
        guest_id: i32,
        limit: Option<u32>,
    ) -> Result<Vec<GuestReservation>, DbError> {
        let limit = self.limit_or_default(limit);
        self.store.guest_reservations(guest_id, limit).await
    }

    /// Searches properties with the optional filters in `options`, cheapest
    /// first, at most `limit` rows.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_all_properties(
        &self,
        options: &PropertySearch,
        limit: Option<u32>,
    ) -> Result<Vec<PropertyListing>, DbError> {
        let query = SearchQuery::from_options(options, self.limit_or_default(limit));
        self.store.search_properties(&query).await
    }

    /// Lists a new property through the same store every read goes to, so it
    /// is immediately visible to `get_all_properties`.
    #[tracing::instrument(level = "debug", skip(self, property), fields(owner_id = property.owner_id))]
    pub async fn add_property(&self, property: &NewProperty) -> Result<Property, DbError> {
        self.store.insert_property(property).await
    }
}
