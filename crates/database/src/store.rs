use crate::error::DbError;
use crate::search::SearchQuery;
use async_trait::async_trait;
use core_types::{GuestReservation, NewProperty, NewUser, Property, PropertyListing, User};

/// The storage seam behind the query gateway.
///
/// Implementations run exactly one statement (or its in-memory equivalent)
/// per call and leave defaults, result shaping and error classification for
/// misses to the gateway. Lookups return `Ok(None)` on a miss.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, DbError>;

    /// Inserts a user and returns the row as stored, id included.
    async fn insert_user(&self, user: &NewUser) -> Result<User, DbError>;

    /// A guest's reservations with property title, nightly cost and the
    /// property's mean rating, earliest start date first.
    async fn guest_reservations(
        &self,
        guest_id: i32,
        limit: u32,
    ) -> Result<Vec<GuestReservation>, DbError>;

    async fn search_properties(&self, query: &SearchQuery)
        -> Result<Vec<PropertyListing>, DbError>;

    /// Inserts a property and returns the row as stored, id included.
    async fn insert_property(&self, property: &NewProperty) -> Result<Property, DbError>;
}
