//! Structs defined here mirror those in [`crate::Tileset`].
//! The main difference is that they're a 1:1 mapping of the tsx format
//! and carry no derived data such as semantic names.
use std::str::Utf8Error;
use derive_more::*;
use roxmltree::{Document, Node};
use crate::{GridOrientation, TileOffset};

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct ParsedTileset {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub tile_offset: Option<TileOffset>,
    pub grid: Option<ParsedGrid>,
    pub tiles: Vec<ParsedTile>,
}

impl ParsedTileset {

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let source = std::str::from_utf8(bytes)?;
        Self::parse_str(source)
    }

    pub fn parse_str(source: &str) -> Result<Self, ParseError> {
        let doc = Document::parse(source)?;
        Self::parse_doc(&doc)
    }

    pub fn parse_doc(doc: &Document) -> Result<Self, ParseError> {
        let root = doc.root_element();
        match root.tag_name().name() {
            "tileset" => Self::parse(root),
            tag_name => Err(ParseError::UnexpectedTag { tag_name: tag_name.into() }),
        }
    }

    pub fn parse(tileset_node: Node) -> Result<Self, ParseError> {
        let mut tileset = ParsedTileset {
            name: required(&tileset_node, "name")?.into(),
            tile_width: positive(&tileset_node, "tilewidth")?,
            tile_height: positive(&tileset_node, "tileheight")?,
            tile_count: non_negative(&tileset_node, "tilecount")?,
            columns: non_negative(&tileset_node, "columns")?,
            ..Default::default()
        };
        if tileset_node.has_attribute("spacing") {
            tileset.spacing = non_negative(&tileset_node, "spacing")?;
        }
        if tileset_node.has_attribute("margin") {
            tileset.margin = non_negative(&tileset_node, "margin")?;
        }

        // Parses children
        for child in tileset_node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "tile" => tileset.tiles.push(ParsedTile::parse(child)?),
                "grid" => tileset.grid = Some(ParsedGrid::parse(child)?),
                "tileoffset" => tileset.tile_offset = Some(TileOffset {
                    x: signed(&child, "x")?,
                    y: signed(&child, "y")?,
                }),
                _ => {}
            }
        }
        log::trace!("Parsed tileset '{}' with {} tile(s)", tileset.name, tileset.tiles.len());
        Ok(tileset)
    }
}

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct ParsedTile {
    pub id: u32,
    pub image: ParsedImage,
}

impl ParsedTile {
    pub fn parse(tile_node: Node) -> Result<Self, ParseError> {
        let id = non_negative(&tile_node, "id")?;
        let image_node = tile_node
            .children()
            .find(|child| child.has_tag_name("image"))
            .ok_or(ParseError::MissingElement { parent: "tile", tag: "image" })?;
        Ok(Self {
            id,
            image: ParsedImage::parse(image_node)?,
        })
    }
}

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct ParsedImage {
    pub source: String,
    pub width: u32,
    pub height: u32,
}

impl ParsedImage {
    pub fn parse(image_node: Node) -> Result<Self, ParseError> {
        Ok(Self {
            source: required(&image_node, "source")?.into(),
            width: positive(&image_node, "width")?,
            height: positive(&image_node, "height")?,
        })
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ParsedGrid {
    pub orientation: GridOrientation,
    pub width: u32,
    pub height: u32,
}

impl ParsedGrid {
    pub fn parse(grid_node: Node) -> Result<Self, ParseError> {
        let orientation = match grid_node.attribute("orientation") {
            Some(value) => GridOrientation::parse(value)?,
            None => GridOrientation::default(),
        };
        Ok(Self {
            orientation,
            width: positive(&grid_node, "width")?,
            height: positive(&grid_node, "height")?,
        })
    }
}

fn required<'a>(node: &Node<'a, '_>, attribute: &'static str) -> Result<&'a str, ParseError> {
    node.attribute(attribute).ok_or_else(|| ParseError::MissingAttribute {
        tag: node.tag_name().name().into(),
        attribute,
    })
}

fn integer(node: &Node, attribute: &'static str) -> Result<i64, ParseError> {
    let value = required(node, attribute)?;
    value.trim().parse().map_err(|_| ParseError::InvalidNumber {
        attribute,
        value: value.into(),
    })
}

fn signed(node: &Node, attribute: &'static str) -> Result<i32, ParseError> {
    let value = integer(node, attribute)?;
    i32::try_from(value).map_err(|_| ParseError::Overflow { attribute, value })
}

/// Parses an integer attribute that must be at least `min`.
fn bounded(node: &Node, attribute: &'static str, min: i64) -> Result<u32, ParseError> {
    let value = integer(node, attribute)?;
    if value < min {
        return Err(ParseError::OutOfRange { attribute, value, min });
    }
    u32::try_from(value).map_err(|_| ParseError::Overflow { attribute, value })
}

fn positive(node: &Node, attribute: &'static str) -> Result<u32, ParseError> {
    bounded(node, attribute, 1)
}

fn non_negative(node: &Node, attribute: &'static str) -> Result<u32, ParseError> {
    bounded(node, attribute, 0)
}

#[derive(Error, Display, From, Debug)]
pub enum ParseError {
    #[display(fmt="Descriptor is not valid XML: {_0}")]
    XmlError(roxmltree::Error),
    #[display(fmt="Descriptor is not valid UTF-8: {_0}")]
    Utf8Error(Utf8Error),
    #[display(fmt="Unexpected tag '{tag_name}'")]
    #[from(ignore)]
    UnexpectedTag { tag_name: String },
    #[display(fmt="Element <{parent}> is missing a <{tag}> child")]
    #[from(ignore)]
    MissingElement { parent: &'static str, tag: &'static str },
    #[display(fmt="Element <{tag}> is missing attribute '{attribute}'")]
    #[from(ignore)]
    MissingAttribute { tag: String, attribute: &'static str },
    #[display(fmt="Attribute '{attribute}' is not an integer: '{value}'")]
    #[from(ignore)]
    InvalidNumber { attribute: &'static str, value: String },
    #[display(fmt="Attribute '{attribute}' is {value}, expected at least {min}")]
    #[from(ignore)]
    OutOfRange { attribute: &'static str, value: i64, min: i64 },
    #[display(fmt="Attribute '{attribute}' does not fit in 32 bits: {value}")]
    #[from(ignore)]
    Overflow { attribute: &'static str, value: i64 },
    #[display(fmt="Unexpected value {value}")]
    #[from(ignore)]
    InvalidAttributeValue { value: String },
}
