//! Authentication for the Gallery and Koken clients
//!
//! Each function takes its client as first parameter and performs the login
//! request; the client itself decides when a login is needed.

pub mod gallery;
pub use gallery::*;

pub mod koken;
pub use koken::*;
