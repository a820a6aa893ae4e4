mod parse;
mod tile;
mod tileset;
mod variant;
mod validate;

pub use parse::*;
pub use tile::*;
pub use tileset::*;
pub use variant::*;
pub use validate::*;
