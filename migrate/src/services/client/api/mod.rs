//! API operations for the Gallery and Koken clients
//!
//! - Gallery: GalleryRemote commands (album and image listings, image downloads)
//! - Koken: albums, content uploads, cache maintenance

pub mod gallery;
pub use gallery::*;

pub mod koken;
pub use koken::*;
