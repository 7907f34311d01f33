//! # LightBnB Database Crate
//!
//! This crate is the application's query gateway: the only code that knows
//! how users, properties, reservations and reviews are stored.
//!
//! ## Architectural Principles
//!
//! - **Explicit store handle:** `QueryGateway` is constructed over any
//!   `ListingStore`. `DbRepository` runs parameterized SQL on a `PgPool`;
//!   `InMemoryStore` keeps process-local tables with the same semantics and
//!   serves as the test double.
//! - **Typed search filters:** property search accumulates `Predicate`s and
//!   renders them once, so placeholder numbering is always consistent.
//! - **Classified failures:** every call returns `Result<_, DbError>`, which
//!   separates connection failures, constraint violations and misses.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: build the pool and apply the schema.
//! - `QueryGateway`: user lookup and creation, reservation listing, property
//!   search and property creation.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod repository;
pub mod search;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::{DbError, OptionalExt};
pub use gateway::QueryGateway;
pub use memory::InMemoryStore;
pub use repository::DbRepository;
pub use search::{Predicate, SearchQuery, SqlParam};
pub use store::ListingStore;
