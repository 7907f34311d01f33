use crate::error::DbError;
use crate::search::SearchQuery;
use crate::store::ListingStore;
use async_trait::async_trait;
use core_types::{
    GuestReservation, NewProperty, NewPropertyReview, NewReservation, NewUser, Property,
    PropertyListing, PropertyReview, Reservation, User,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    properties: Vec<Property>,
    reservations: Vec<Reservation>,
    reviews: Vec<PropertyReview>,
}

impl Tables {
    fn has_user(&self, id: i32) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn property(&self, id: i32) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    fn average_rating(&self, property_id: i32) -> Option<Decimal> {
        let ratings: Vec<i16> = self
            .reviews
            .iter()
            .filter(|r| r.property_id == property_id)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            return None;
        }
        let total: Decimal = ratings.iter().copied().map(Decimal::from).sum();
        Some(total / Decimal::from(ratings.len()))
    }
}

/// Identifiers are assigned like a SERIAL column: one past the row count.
fn next_id(len: usize) -> Result<i32, DbError> {
    i32::try_from(len + 1)
        .map_err(|_| DbError::constraint("serial", "identifier space exhausted"))
}

/// A process-local `ListingStore`.
///
/// Mirrors the relational schema's constraints (unique email, foreign keys)
/// and the search/reservation semantics of `DbRepository`. Clones share the
/// same tables, so a test can keep a handle while the gateway owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(reservation.guest_id) {
            return Err(DbError::constraint(
                "reservations_guest_id_fkey",
                format!("guest {} does not exist", reservation.guest_id),
            ));
        }
        if tables.property(reservation.property_id).is_none() {
            return Err(DbError::constraint(
                "reservations_property_id_fkey",
                format!("property {} does not exist", reservation.property_id),
            ));
        }

        let row = Reservation {
            id: next_id(tables.reservations.len())?,
            guest_id: reservation.guest_id,
            property_id: reservation.property_id,
            start_date: reservation.start_date,
            end_date: reservation.end_date,
        };
        tables.reservations.push(row.clone());
        Ok(row)
    }

    pub async fn insert_review(&self, review: NewPropertyReview) -> Result<PropertyReview, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(review.guest_id) {
            return Err(DbError::constraint(
                "property_reviews_guest_id_fkey",
                format!("guest {} does not exist", review.guest_id),
            ));
        }
        if tables.property(review.property_id).is_none() {
            return Err(DbError::constraint(
                "property_reviews_property_id_fkey",
                format!("property {} does not exist", review.property_id),
            ));
        }
        let Some(reservation) = tables
            .reservations
            .iter()
            .find(|r| r.id == review.reservation_id)
        else {
            return Err(DbError::constraint(
                "property_reviews_reservation_id_fkey",
                format!("reservation {} does not exist", review.reservation_id),
            ));
        };
        if reservation.property_id != review.property_id {
            return Err(DbError::constraint(
                "property_reviews_reservation_property_fkey",
                format!(
                    "reservation {} is for property {}, not {}",
                    reservation.id, reservation.property_id, review.property_id
                ),
            ));
        }
        if !(0..=5).contains(&review.rating) {
            return Err(DbError::constraint(
                "property_reviews_rating_check",
                format!("rating {} is outside 0..=5", review.rating),
            ));
        }

        let row = PropertyReview {
            id: next_id(tables.reviews.len())?,
            guest_id: review.guest_id,
            property_id: review.property_id,
            reservation_id: review.reservation_id,
            rating: review.rating,
            message: review.message,
        };
        tables.reviews.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl ListingStore for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, DbError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(DbError::constraint(
                "users_email_key",
                format!("a user with email {} already exists", user.email),
            ));
        }

        let row = user.clone().into_user(next_id(tables.users.len())?);
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn guest_reservations(
        &self,
        guest_id: i32,
        limit: u32,
    ) -> Result<Vec<GuestReservation>, DbError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<GuestReservation> = tables
            .reservations
            .iter()
            .filter(|r| r.guest_id == guest_id)
            .filter_map(|r| {
                let property = tables.property(r.property_id)?;
                Some(GuestReservation {
                    reservation: r.clone(),
                    title: property.title.clone(),
                    cost_per_night: property.cost_per_night,
                    average_rating: tables.average_rating(property.id),
                })
            })
            .collect();
        rows.sort_by_key(|row| (row.reservation.start_date, row.reservation.id));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn search_properties(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<PropertyListing>, DbError> {
        let tables = self.tables.read().await;
        let listings = tables.properties.iter().map(|property| PropertyListing {
            property: property.clone(),
            average_rating: tables.average_rating(property.id),
        });
        Ok(query.apply(listings))
    }

    async fn insert_property(&self, property: &NewProperty) -> Result<Property, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.has_user(property.owner_id) {
            return Err(DbError::constraint(
                "properties_owner_id_fkey",
                format!("owner {} does not exist", property.owner_id),
            ));
        }

        let row = property
            .clone()
            .into_property(next_id(tables.properties.len())?);
        tables.properties.push(row.clone());
        Ok(row)
    }
}
