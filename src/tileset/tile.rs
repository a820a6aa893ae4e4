use std::fmt;
use derive_more::*;
use crate::ParseError;

/// A single entry of a [`Tileset`](crate::Tileset).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TileDefinition {
    /// ID of tile local to its tileset.
    pub id: u32,
    /// Image path exactly as written in the descriptor, relative to it.
    pub asset_path: String,
    /// Declared pixel width of the image. Not checked against the image itself.
    pub width: u32,
    /// Declared pixel height of the image. Not checked against the image itself.
    pub height: u32,
    /// Orientation-independent base name. Empty if `asset_path` is malformed,
    /// which validation rejects before the tile becomes reachable through an index.
    pub semantic_name: String,
    pub orientation: Orientation,
}

impl TileDefinition {
    pub fn new(id: u32, asset_path: impl Into<String>, width: u32, height: u32) -> Self {
        let asset_path = asset_path.into();
        let TileSemantics { semantic_name, orientation } = derive_semantics(&asset_path)
            .unwrap_or_default();
        Self {
            id,
            asset_path,
            width,
            height,
            semantic_name,
            orientation,
        }
    }
}

/// Directional rendering of a tile, decoded from a `_N`, `_E`, `_S` or `_W` file name suffix.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Debug)]
pub enum Orientation {
    N,
    E,
    S,
    W,
    /// Asset has no directional suffix.
    #[default]
    None,
}

impl Orientation {

    /// The four directional orientations, in slot order.
    pub const CARDINALS: [Orientation; 4] = [Self::N, Self::E, Self::S, Self::W];

    /// Every orientation, in slot order.
    pub const ALL: [Orientation; 5] = [Self::N, Self::E, Self::S, Self::W, Self::None];

    /// Parses the textual form used in configuration and tooling.
    pub fn parse(str: &str) -> Result<Self, ParseError> {
        match str {
            "N" => Ok(Self::N),
            "E" => Ok(Self::E),
            "S" => Ok(Self::S),
            "W" => Ok(Self::W),
            "none" => Ok(Self::None),
            _ => Err(ParseError::InvalidAttributeValue { value: String::from(str) })
        }
    }

    /// Decodes a file name suffix. Only the exact single letters count.
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "N" => Some(Self::N),
            "E" => Some(Self::E),
            "S" => Some(Self::S),
            "W" => Some(Self::W),
            _ => None,
        }
    }

    /// Position of this orientation in fixed-size per-orientation tables.
    pub fn slot(self) -> usize {
        match self {
            Self::N => 0,
            Self::E => 1,
            Self::S => 2,
            Self::W => 3,
            Self::None => 4,
        }
    }

    pub fn is_cardinal(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str = match self {
            Self::N => "N",
            Self::E => "E",
            Self::S => "S",
            Self::W => "W",
            Self::None => "none",
        };
        f.write_str(str)
    }
}

/// Semantic name and orientation of an asset path.
#[derive(Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct TileSemantics {
    pub semantic_name: String,
    pub orientation: Orientation,
}

/**
 * Splits an asset path into its semantic name and orientation.
 *
 * The file name without directory and extension is the stem. A stem ending in an underscore
 * followed by exactly one of `N`, `E`, `S` or `W` is a directional variant: the letter is the
 * orientation and the text before the underscore is the semantic name. Any other stem is
 * unoriented and names itself.
 *
 * Known limitation: an asset whose real name happens to end in `_N` (or another direction letter)
 * is indistinguishable from a variant and will be classified as one.
 */
pub fn derive_semantics(asset_path: &str) -> Result<TileSemantics, MalformedAssetPathError> {
    let file_name = asset_path.rsplit(['/', '\\']).next().unwrap_or(asset_path);
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _extension)) => stem,
        None => file_name,
    };
    if stem.is_empty() {
        return Err(MalformedAssetPathError { path: asset_path.into() });
    }
    if let Some((name, suffix)) = stem.rsplit_once('_') {
        if let Some(orientation) = Orientation::from_suffix(suffix).filter(|_| !name.is_empty()) {
            return Ok(TileSemantics { semantic_name: name.into(), orientation });
        }
    }
    Ok(TileSemantics {
        semantic_name: stem.into(),
        orientation: Orientation::None,
    })
}

#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
#[display(fmt="Cannot derive a tile name from asset path '{path}'")]
pub struct MalformedAssetPathError {
    pub path: String,
}
