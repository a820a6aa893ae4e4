use std::iter::FusedIterator;
use std::slice;
use derive_more::*;
use tracing::instrument;
use crate::{join_asset_path, validate_with, CatalogConfig, HashMap, IntMap, Orientation, TileDefinition, Tileset, ValidationError, ValidationReport, VariantGroup};

/**
 * Validated, immutable tileset with lookup tables for ids, semantic names and variants.
 * Built once per load. Lookups never lock or allocate.
 */
#[derive(Debug)]
pub struct TilesetIndex {
    tileset: Tileset,
    by_id: IntMap<u32, usize>,          // Tile id -> position in tileset.tiles
    ascending: Vec<usize>,              // Positions sorted by tile id
    groups: HashMap<String, [Option<usize>; 5]>,
}

impl TilesetIndex {

    /// Validates the tileset, then indexes it.
    /// Fails if validation produced a fatal finding, or any finding when warnings are denied.
    #[instrument(skip_all)]
    pub fn build(tileset: Tileset, config: &CatalogConfig) -> Result<(Self, ValidationReport), ValidationError> {
        let report = validate_with(&tileset, config).into_result(config.deny_warnings)?;

        let mut by_id = IntMap::default();
        let mut groups: HashMap<String, [Option<usize>; 5]> = HashMap::default();
        for (position, tile) in tileset.tiles.iter().enumerate() {
            by_id.insert(tile.id, position);
            let slots = groups.entry(tile.semantic_name.clone()).or_default();
            slots[tile.orientation.slot()] = Some(position);
        }
        let mut ascending: Vec<usize> = (0..tileset.tiles.len()).collect();
        ascending.sort_unstable_by_key(|position| tileset.tiles[*position].id);

        log::debug!(
            "Indexed tileset '{}': {} tile(s), {} semantic name(s)",
            tileset.name,
            ascending.len(),
            groups.len(),
        );
        let index = Self { tileset, by_id, ascending, groups };
        Ok((index, report))
    }

    /// Parses and indexes descriptor text with the default config.
    pub fn parse_str(source: &str) -> Result<Self, IndexError> {
        let tileset = Tileset::parse_str(source)?;
        let (index, _) = Self::build(tileset, &CatalogConfig::default())?;
        Ok(index)
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    pub fn name(&self) -> &str {
        &self.tileset.name
    }

    pub fn len(&self) -> usize {
        self.ascending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ascending.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn by_id(&self, id: u32) -> Result<&TileDefinition, NotFoundError> {
        match self.by_id.get(&id) {
            Some(position) => Ok(&self.tileset.tiles[*position]),
            None => Err(NotFoundError::Id { id }),
        }
    }

    /// All variants of a semantic name. Succeeds even if only one orientation exists.
    pub fn by_semantic_name(&self, name: &str) -> Result<VariantGroup<'_>, NotFoundError> {
        let (semantic_name, slots) = self.groups
            .get_key_value(name)
            .ok_or_else(|| NotFoundError::SemanticName { name: name.into() })?;
        let tiles = (*slots).map(|slot| slot.map(|position| &self.tileset.tiles[position]));
        Ok(VariantGroup::new(semantic_name, tiles))
    }

    /// Exact (name, orientation) lookup. Never falls back to another orientation.
    pub fn resolve(&self, name: &str, orientation: Orientation) -> Result<&TileDefinition, NotFoundError> {
        self.groups
            .get(name)
            .and_then(|slots| slots[orientation.slot()])
            .map(|position| &self.tileset.tiles[position])
            .ok_or_else(|| NotFoundError::Variant { name: name.into(), orientation })
    }

    /// Tiles in ascending id order. Call again to restart.
    pub fn iter(&self) -> Tiles<'_> {
        Tiles {
            tiles: &self.tileset.tiles,
            positions: self.ascending.iter(),
        }
    }

    /// Semantic names in no particular order.
    pub fn semantic_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Asset path of a tile joined onto the directory of its descriptor.
    pub fn asset_location(&self, id: u32) -> Result<String, NotFoundError> {
        let tile = self.by_id(id)?;
        Ok(join_asset_path(self.tileset.source_dir.as_deref(), &tile.asset_path))
    }
}

impl<'a> IntoIterator for &'a TilesetIndex {
    type Item = &'a TileDefinition;
    type IntoIter = Tiles<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the tiles of a [`TilesetIndex`] in ascending id order.
#[derive(Clone, Debug)]
pub struct Tiles<'a> {
    tiles: &'a [TileDefinition],
    positions: slice::Iter<'a, usize>,
}

impl<'a> Iterator for Tiles<'a> {
    type Item = &'a TileDefinition;

    fn next(&mut self) -> Option<Self::Item> {
        self.positions.next().map(|position| &self.tiles[*position])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl<'a> DoubleEndedIterator for Tiles<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.positions.next_back().map(|position| &self.tiles[*position])
    }
}

impl ExactSizeIterator for Tiles<'_> {}
impl FusedIterator for Tiles<'_> {}

#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum NotFoundError {
    #[display(fmt="No tile with id {id}")]
    Id { id: u32 },
    #[display(fmt="No tile named '{name}'")]
    SemanticName { name: String },
    #[display(fmt="No tile named '{name}' with orientation {orientation}")]
    Variant { name: String, orientation: Orientation },
    #[display(fmt="No tileset covers gid {gid}")]
    Gid { gid: u32 },
    #[display(fmt="No tileset named '{name}'")]
    Tileset { name: String },
}

/// Failure of [`TilesetIndex::parse_str`].
#[derive(Error, Display, From, Debug)]
pub enum IndexError {
    #[display(fmt="{_0}")]
    Parse(crate::ParseError),
    #[display(fmt="{_0}")]
    Validation(ValidationError),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::DUNGEON_TSX;

    fn sample() -> TilesetIndex {
        TilesetIndex::parse_str(DUNGEON_TSX).unwrap()
    }

    #[test]
    fn by_id_round_trip() {
        let index = sample();
        assert_eq!(252, index.len());
        for tile in &index.tileset().tiles {
            assert_eq!(tile, index.by_id(tile.id).unwrap());
        }
        assert_eq!(Err(NotFoundError::Id { id: 252 }), index.by_id(252));
    }

    #[test]
    fn resolve_exact_variant() {
        let index = sample();
        assert_eq!(1, index.resolve("barrel", Orientation::N).unwrap().id);
        assert_eq!(
            Err(NotFoundError::Variant { name: String::from("barrel"), orientation: Orientation::None }),
            index.resolve("barrel", Orientation::None)
        );
        assert!(index.resolve("unicorn", Orientation::N).is_err());
    }

    #[test]
    fn variant_group() {
        let index = sample();
        let group = index.by_semantic_name("chestOpen").unwrap();
        assert_eq!("chestOpen", group.semantic_name());
        assert_eq!(4, group.len());
        assert!(group.is_complete());
        assert_eq!(
            vec![Orientation::N, Orientation::E, Orientation::S, Orientation::W],
            group.orientations().collect::<Vec<_>>()
        );
        let mut ids: Vec<u32> = group.iter().map(|(_, tile)| tile.id).collect();
        ids.sort();
        assert_eq!(vec![28, 29, 30, 31], ids);
        assert_eq!(None, group.get(Orientation::None));
        assert_eq!(
            Err(NotFoundError::SemanticName { name: String::from("chest") }),
            index.by_semantic_name("chest").map(|group| group.len())
        );
    }

    #[test]
    fn single_member_group() {
        let source = r#"<tileset name="t" tilewidth="8" tileheight="8" tilecount="2" columns="0">
            <tile id="9"><image width="8" height="8" source="tiles/floor.png"/></tile>
            <tile id="3"><image width="8" height="16" source="tiles/pillar.png"/></tile>
        </tileset>"#;
        let tileset = Tileset::parse_str(source).unwrap();
        let (index, report) = TilesetIndex::build(tileset, &CatalogConfig::default()).unwrap();
        assert_eq!(2, report.warnings().count());
        let group = index.by_semantic_name("floor").unwrap();
        assert_eq!(1, group.len());
        assert_eq!(9, group.get(Orientation::None).unwrap().id);
        assert_eq!(
            vec![Orientation::N, Orientation::E, Orientation::S, Orientation::W],
            group.missing()
        );
        let mut names: Vec<&str> = index.semantic_names().collect();
        names.sort();
        assert_eq!(vec!["floor", "pillar"], names);
    }

    #[test]
    fn iteration_is_ascending_and_restartable() {
        let source = r#"<tileset name="t" tilewidth="8" tileheight="8" tilecount="3" columns="0">
            <tile id="7"><image width="8" height="8" source="c.png"/></tile>
            <tile id="2"><image width="8" height="8" source="a.png"/></tile>
            <tile id="5"><image width="8" height="8" source="b.png"/></tile>
        </tileset>"#;
        let index = TilesetIndex::parse_str(source).unwrap();
        let tiles = index.iter();
        assert_eq!(3, tiles.len());
        let first: Vec<u32> = tiles.clone().map(|tile| tile.id).collect();
        let second: Vec<u32> = tiles.map(|tile| tile.id).collect();
        assert_eq!(vec![2, 5, 7], first);
        assert_eq!(first, second);
        let reversed: Vec<u32> = index.iter().rev().map(|tile| tile.id).collect();
        assert_eq!(vec![7, 5, 2], reversed);

        let sample = sample();
        let ids: Vec<u32> = (&sample).into_iter().map(|tile| tile.id).collect();
        assert_eq!((0..252).collect::<Vec<u32>>(), ids);
    }

    #[test]
    fn build_rejects_fatal_findings() {
        let mut tileset = Tileset::parse_str(DUNGEON_TSX).unwrap();
        tileset.tiles[10].id = 0;
        let err = TilesetIndex::build(tileset, &CatalogConfig::default()).unwrap_err();
        assert!(err.report.has_fatal());
    }

    #[test]
    fn build_denies_warnings_when_configured() {
        let source = r#"<tileset name="t" tilewidth="8" tileheight="8" tilecount="1" columns="0">
            <tile id="0"><image width="8" height="8" source="door_N.png"/></tile>
        </tileset>"#;
        let tileset = Tileset::parse_str(source).unwrap();
        let (_, report) = TilesetIndex::build(tileset.clone(), &CatalogConfig::default()).unwrap();
        assert_eq!(1, report.warnings().count());

        let config = CatalogConfig { deny_warnings: true, ..Default::default() };
        assert!(TilesetIndex::build(tileset, &config).is_err());
    }

    #[test]
    fn asset_location() {
        let tileset = Tileset::parse_str(DUNGEON_TSX)
            .unwrap()
            .with_source_dir(Some(String::from("assets/map")));
        let (index, _) = TilesetIndex::build(tileset, &CatalogConfig::default()).unwrap();
        assert_eq!("assets/map/isometric_dungeon/barrel_N.png", index.asset_location(1).unwrap());
        assert!(index.asset_location(999).is_err());
    }
}
