use std::collections::BTreeMap;
use std::fmt;
use derive_more::*;
use crate::{derive_semantics, escapes_root, CatalogConfig, MalformedAssetPathError, Orientation, Tileset};

/// Validates a tileset with the default [`CatalogConfig`].
pub fn validate(tileset: &Tileset) -> ValidationReport {
    validate_with(tileset, &CatalogConfig::default())
}

/**
 * Checks a tileset for defects and reports every one of them.
 * Findings are ordered by kind, then by tile id or semantic name.
 */
pub fn validate_with(tileset: &Tileset, config: &CatalogConfig) -> ValidationReport {
    let mut findings = Vec::new();

    // Primary key
    let mut occurrences: BTreeMap<u32, usize> = BTreeMap::new();
    for tile in &tileset.tiles {
        *occurrences.entry(tile.id).or_default() += 1;
    }
    findings.extend(occurrences
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, count)| Finding::DuplicateId { id: *id, occurrences: *count })
    );

    // Declared count
    if tileset.tile_count as usize != tileset.tiles.len() {
        findings.push(Finding::TileCountMismatch {
            declared: tileset.tile_count,
            actual: tileset.tiles.len(),
        });
    }

    // Asset paths. Distinct ids are grouped by semantic name for the variant checks.
    let mut groups: BTreeMap<&str, [Vec<u32>; 5]> = BTreeMap::new();
    for tile in &tileset.tiles {
        if tile.asset_path.is_empty() {
            findings.push(Finding::EmptyAssetPath { id: tile.id });
            continue;
        }
        if escapes_root(&tile.asset_path) {
            findings.push(Finding::PathTraversal { id: tile.id, path: tile.asset_path.clone() });
        }
        if let Err(error) = derive_semantics(&tile.asset_path) {
            findings.push(Finding::MalformedAssetPath { id: tile.id, error });
            continue;
        }
        let slots = groups.entry(tile.semantic_name.as_str()).or_default();
        let ids = &mut slots[tile.orientation.slot()];
        if !ids.contains(&tile.id) {
            ids.push(tile.id);
        }
    }

    // Variants
    for (semantic_name, slots) in &groups {
        for orientation in Orientation::ALL {
            let ids = &slots[orientation.slot()];
            if ids.len() > 1 {
                findings.push(Finding::AmbiguousVariant {
                    semantic_name: String::from(*semantic_name),
                    orientation,
                    ids: ids.clone(),
                });
            }
        }
    }
    if config.warn_incomplete_variants {
        for (semantic_name, slots) in &groups {
            let missing: Vec<Orientation> = Orientation::CARDINALS
                .into_iter()
                .filter(|orientation| slots[orientation.slot()].is_empty())
                .collect();
            if !missing.is_empty() {
                findings.push(Finding::IncompleteVariantGroup {
                    semantic_name: String::from(*semantic_name),
                    missing,
                });
            }
        }
    }

    ValidationReport { tileset: tileset.name.clone(), findings }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    Warning,
    Fatal,
}

/// A single defect found in a tileset.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Finding {
    DuplicateId { id: u32, occurrences: usize },
    TileCountMismatch { declared: u32, actual: usize },
    EmptyAssetPath { id: u32 },
    PathTraversal { id: u32, path: String },
    MalformedAssetPath { id: u32, error: MalformedAssetPathError },
    /// Several tiles claim the same semantic name and orientation.
    AmbiguousVariant { semantic_name: String, orientation: Orientation, ids: Vec<u32> },
    /// A group lacks some cardinal orientations. Unoriented-only groups lack all four.
    IncompleteVariantGroup { semantic_name: String, missing: Vec<Orientation> },
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Self::IncompleteVariantGroup { .. } => Severity::Warning,
            _ => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id, occurrences } => write!(f, "Tile id {id} is used {occurrences} times"),
            Self::TileCountMismatch { declared, actual } => write!(f, "Declared tilecount {declared} but found {actual} tiles"),
            Self::EmptyAssetPath { id } => write!(f, "Tile {id} has an empty image source"),
            Self::PathTraversal { id, path } => write!(f, "Tile {id} image source '{path}' escapes the tileset directory"),
            Self::MalformedAssetPath { id, error } => write!(f, "Tile {id}: {error}"),
            Self::AmbiguousVariant { semantic_name, orientation, ids } => {
                write!(f, "'{semantic_name}' has {} tiles for orientation {orientation}: {ids:?}", ids.len())
            },
            Self::IncompleteVariantGroup { semantic_name, missing } => {
                let missing: Vec<String> = missing.iter().map(Orientation::to_string).collect();
                write!(f, "'{semantic_name}' has no {} variant", missing.join("/"))
            },
        }
    }
}

/// Every finding of one validation pass.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct ValidationReport {
    pub tileset: String,
    pub findings: Vec<Finding>,
}

impl ValidationReport {

    pub fn fatal(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|finding| finding.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|finding| !finding.is_fatal())
    }

    pub fn has_fatal(&self) -> bool {
        self.fatal().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Fails if the report holds a fatal finding, or any finding at all when `deny_warnings` is set.
    pub fn into_result(self, deny_warnings: bool) -> Result<Self, ValidationError> {
        let rejected = self.has_fatal() || (deny_warnings && !self.is_empty());
        if rejected {
            return Err(ValidationError { deny_warnings, report: self });
        }
        Ok(self)
    }
}

/// A tileset was rejected by validation. Holds the full report.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub struct ValidationError {
    pub deny_warnings: bool,
    pub report: ValidationReport,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rejected: Vec<&Finding> = match self.deny_warnings {
            true => self.report.findings.iter().collect(),
            false => self.report.fatal().collect(),
        };
        write!(f, "Tileset '{}' failed validation with {} finding(s)", self.report.tileset, rejected.len())?;
        for finding in rejected {
            write!(f, "\n  - {finding}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::DUNGEON_TSX;
    use crate::TileDefinition;

    fn tileset(tiles: &[(u32, &str)]) -> Tileset {
        Tileset {
            name: String::from("test"),
            tile_width: 32,
            tile_height: 32,
            tile_count: tiles.len() as u32,
            tiles: tiles
                .iter()
                .map(|(id, path)| TileDefinition::new(*id, *path, 32, 32))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn sample_is_clean() {
        let tileset = Tileset::parse_str(DUNGEON_TSX).unwrap();
        let report = validate(&tileset);
        assert!(!report.has_fatal());
        assert!(report.is_empty(), "{:?}", report.findings);
    }

    #[test]
    fn duplicate_id_reported_once() {
        let mut tileset = Tileset::parse_str(DUNGEON_TSX).unwrap();
        let mut copy = tileset.tiles[5].clone();
        copy.id = 4;
        tileset.tiles[5] = copy;
        let report = validate(&tileset);
        let duplicates: Vec<&Finding> = report
            .fatal()
            .filter(|finding| matches!(finding, Finding::DuplicateId { .. }))
            .collect();
        assert_eq!(vec![&Finding::DuplicateId { id: 4, occurrences: 2 }], duplicates);
    }

    #[test]
    fn duplicate_rows_are_not_ambiguous() {
        let tileset = tileset(&[(0, "a_N.png"), (0, "a_N.png"), (1, "a_E.png"), (2, "a_S.png"), (3, "a_W.png")]);
        let report = validate(&tileset);
        assert_eq!(vec![Finding::DuplicateId { id: 0, occurrences: 2 }], report.findings);
    }

    #[test]
    fn tile_count_mismatch() {
        let mut tileset = tileset(&[(0, "floor.png")]);
        tileset.tile_count = 3;
        let report = validate(&tileset);
        assert_eq!(vec![Finding::TileCountMismatch { declared: 3, actual: 1 }], report.fatal().cloned().collect::<Vec<_>>());
        assert!(report.has_fatal());
    }

    #[test]
    fn bad_asset_paths() {
        let tileset = tileset(&[
            (0, ""),
            (1, "../outside_N.png"),
            (2, "dir/.png"),
            (3, "/abs/floor.png"),
        ]);
        let report = validate(&tileset);
        assert!(report.findings.contains(&Finding::EmptyAssetPath { id: 0 }));
        assert!(report.findings.contains(&Finding::PathTraversal { id: 1, path: String::from("../outside_N.png") }));
        assert!(report.findings.iter().any(|finding| matches!(finding, Finding::MalformedAssetPath { id: 2, .. })));
        assert!(report.findings.contains(&Finding::PathTraversal { id: 3, path: String::from("/abs/floor.png") }));
        // "outside" only has a north variant, "floor" has none
        assert_eq!(2, report.warnings().count());
        assert_eq!(6, report.len());
    }

    #[test]
    fn ambiguous_variant() {
        let tileset = tileset(&[
            (0, "a/crate_N.png"),
            (1, "b/crate_N.png"),
            (2, "crate_E.png"),
            (3, "crate_S.png"),
            (4, "crate_W.png"),
        ]);
        let report = validate(&tileset);
        let expected = Finding::AmbiguousVariant {
            semantic_name: String::from("crate"),
            orientation: Orientation::N,
            ids: vec![0, 1],
        };
        assert_eq!(vec![expected], report.findings);
    }

    #[test]
    fn incomplete_group_is_a_warning() {
        let tileset = tileset(&[(0, "bridge_N.png"), (1, "bridge_S.png"), (2, "floor.png")]);
        let report = validate(&tileset);
        let bridge = Finding::IncompleteVariantGroup {
            semantic_name: String::from("bridge"),
            missing: vec![Orientation::E, Orientation::W],
        };
        let floor = Finding::IncompleteVariantGroup {
            semantic_name: String::from("floor"),
            missing: Orientation::CARDINALS.to_vec(),
        };
        assert_eq!(vec![bridge.clone(), floor.clone()], report.findings);
        assert_eq!(Severity::Warning, bridge.severity());
        assert!(!report.has_fatal());
        assert_eq!("'bridge' has no E/W variant", bridge.to_string());
        assert_eq!("'floor' has no N/E/S/W variant", floor.to_string());

        let config = CatalogConfig { warn_incomplete_variants: false, ..Default::default() };
        assert!(validate_with(&tileset, &config).is_empty());
    }

    #[test]
    fn unoriented_only_group_is_incomplete() {
        let tileset = tileset(&[(0, "floor.png")]);
        let report = validate(&tileset);
        assert_eq!(1, report.warnings().count());
        assert!(!report.has_fatal());
        assert!(report.clone().into_result(false).is_ok());
        assert!(report.into_result(true).is_err());
    }

    #[test]
    fn into_result() {
        let tileset = tileset(&[(0, "bridge_N.png")]);
        let report = validate(&tileset);
        assert!(report.clone().into_result(false).is_ok());
        let err = report.into_result(true).unwrap_err();
        assert!(err.to_string().contains("bridge"));

        let mut tileset = tileset;
        tileset.tile_count = 2;
        let err = validate(&tileset).into_result(false).unwrap_err();
        assert_eq!(1, err.report.fatal().count());
    }
}
