//! Loads Tiled tileset descriptors, validates them and serves typed lookups by id,
//! semantic name, orientation and map-global id.
mod asset;
mod catalog;
mod config;
mod index;
mod library;
mod tileset;
mod util;

pub use asset::*;
pub use catalog::*;
pub use config::*;
pub use index::*;
pub use library::*;
pub use tileset::*;
pub use util::*;
