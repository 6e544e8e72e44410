//! Database module
//!
//! This module handles the document store backends, connections and the
//! typed repositories built on top of them

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod repositories;
pub mod service;
pub mod store;
pub mod target;

// Re-export commonly used database components
pub use connection::{create_pool, health_check, open_store, run_migrations, DatabasePool, PoolOptions};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use repositories::{
    ActivityRepository, CalificationRepository, EventRepository, FileRepository, MainConfigRepository,
    TicketRepository, UserRepository, WitnessRepository,
};
pub use service::DatabaseService;
pub use store::{collections, Document, DocumentStore, SeatReservation};
pub use target::{ResolvedTarget, TargetResolver};
