use crate::{ParseError, ParsedTileset, TileDefinition};

/// Immutable catalog of tile images read from one tsx descriptor.
/// Tiles are kept in document order.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Tileset {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    /// Declared number of tiles. Validation checks it against `tiles`.
    pub tile_count: u32,
    /// Zero for image collection tilesets, whose tiles may each have their own size.
    pub columns: u32,
    pub tile_offset: Option<TileOffset>,
    pub grid: Option<Grid>,
    /// Directory of the descriptor this tileset was read from, if known.
    pub source_dir: Option<String>,
    pub tiles: Vec<TileDefinition>,
}

impl Tileset {

    /// Parses descriptor text. Fails on the first problem found.
    pub fn parse_str(source: &str) -> Result<Self, ParseError> {
        ParsedTileset::parse_str(source).map(Self::from_parsed)
    }

    /// Parses descriptor bytes, which must be UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        ParsedTileset::parse_bytes(bytes).map(Self::from_parsed)
    }

    pub fn from_parsed(parsed: ParsedTileset) -> Self {
        let tiles = parsed.tiles
            .into_iter()
            .map(|tile| TileDefinition::new(tile.id, tile.image.source, tile.image.width, tile.image.height))
            .collect();
        Self {
            name: parsed.name,
            tile_width: parsed.tile_width,
            tile_height: parsed.tile_height,
            spacing: parsed.spacing,
            margin: parsed.margin,
            tile_count: parsed.tile_count,
            columns: parsed.columns,
            tile_offset: parsed.tile_offset,
            grid: parsed.grid.map(|grid| Grid {
                orientation: grid.orientation,
                width: grid.width,
                height: grid.height,
            }),
            source_dir: None,
            tiles,
        }
    }

    pub fn with_source_dir(mut self, source_dir: Option<String>) -> Self {
        self.source_dir = source_dir;
        self
    }

    /// False for image collection tilesets, which have no uniform cell geometry.
    pub fn is_grid(&self) -> bool {
        self.columns != 0
    }

    /// Number of rows for grid tilesets.
    pub fn rows(&self) -> Option<u32> {
        if !self.is_grid() { return None }
        Some(self.tile_count.div_ceil(self.columns))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct TileOffset { pub x: i32, pub y: i32 }

#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub enum GridOrientation {
    #[default]
    Orthogonal,
    Isometric,
}

impl GridOrientation {
    pub fn parse(str: &str) -> Result<Self, ParseError> {
        match str {
            "orthogonal" => Ok(Self::Orthogonal),
            "isometric" => Ok(Self::Isometric),
            _ => Err(ParseError::InvalidAttributeValue { value: String::from(str) })
        }
    }
}

/// Grid used when tiles of an image collection are placed in the editor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct Grid {
    pub orientation: GridOrientation,
    pub width: u32,
    pub height: u32,
}
