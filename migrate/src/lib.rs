//! This crate contains the service clients and migration logic for moving
//! Gallery 2 albums into a Koken installation.

pub mod migration;
pub mod services;

pub use migration::{migrate_albums, MigrationOrchestrator, MigrationReport};
