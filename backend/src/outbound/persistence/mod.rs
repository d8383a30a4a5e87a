//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the hangout storage ports
//! and the notifier, backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. Lifecycle rules stay in the domain.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are never exposed to the domain layer.
//! - **Guarded transitions**: Status changes are conditional updates, so the
//!   row count tells the caller whether it won the transition.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselHangoutRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/meetsync")).await?;
//! let hangouts = DieselHangoutRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_hangout_repository;
mod diesel_notifier;
mod diesel_poll_repository;
mod diesel_recommendation_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_hangout_repository::DieselHangoutRepository;
pub use diesel_notifier::DieselNotifier;
pub use diesel_poll_repository::DieselPollRepository;
pub use diesel_recommendation_repository::DieselRecommendationRepository;
pub use migrations::{MIGRATIONS, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
