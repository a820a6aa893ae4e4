mod protocol;
mod path_parts;

pub use protocol::*;
pub use path_parts::*;
