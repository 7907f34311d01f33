pub mod search;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use search::PropertySearch;
pub use structs::{
    GuestReservation, NewProperty, NewPropertyReview, NewReservation, NewUser, Property,
    PropertyListing, PropertyReview, Reservation, User,
};
