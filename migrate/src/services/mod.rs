//! Infrastructure Services
//!
//! This module provides the infrastructure the migration is built on:
//!
//! - **client**: Gallery 2 (GalleryRemote protocol) and Koken HTTP clients,
//!   wire codecs and the shared transport
//! - **config**: Configuration loading and validation
//! - **errors**: Run-level error types

pub mod client;
pub mod config;
pub mod errors;
