//! Database repository implementations
//!
//! One module per table. Writes are plain functions over any
//! `ConnectionTrait` so a service can run several of them on one
//! transaction.

pub mod assignment_repository;
pub mod catalog_repository;
pub mod rate_repository;
pub mod ratebook_repository;

pub use ratebook_repository::SeaOrmRatebookLookup;
