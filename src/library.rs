use bitflags::bitflags;
use rayon::prelude::*;
use tracing::instrument;
use crate::{Catalog, HashSet, LoadError, NotFoundError, Snapshot, TileDefinition, TilesetIndex, ValidationReport};

bitflags! {
    /// Flip and rotation bits stored in the top four bits of a [`Gid`].
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
    pub struct FlipFlags: u32 {
        const HORIZONTAL    = 0x8000_0000;
        const VERTICAL      = 0x4000_0000;
        const DIAGONAL      = 0x2000_0000;
        const ROTATED_HEX   = 0x1000_0000;
    }
}

/// Global tile id, as stored in map layers.
/// First gid of a tileset plus the local tile id, with [`FlipFlags`] on top. Zero is an empty cell.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default, Debug)]
pub struct Gid(pub u32);

impl Gid {
    pub fn flags(self) -> FlipFlags {
        FlipFlags::from_bits_truncate(self.0)
    }

    /// Gid with flip flags cleared.
    pub fn id(self) -> u32 {
        self.0 & !FlipFlags::all().bits()
    }

    pub fn is_empty(self) -> bool {
        self.id() == 0
    }
}

/// A tile found through its [`Gid`].
#[derive(Copy, Clone, Debug)]
pub struct ResolvedTile<'a> {
    pub tileset: &'a TilesetIndex,
    pub tile: &'a TileDefinition,
    pub flags: FlipFlags,
}

/**
 * Several tilesets addressed the way a map addresses them: each one starts at a first gid.
 * Entries are kept sorted by first gid. First gids start at 1, since gid 0 means "no tile".
 */
#[derive(Clone, Default, Debug)]
pub struct TilesetLibrary {
    entries: Vec<(u32, Snapshot)>,
}

impl TilesetLibrary {

    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every descriptor in parallel.
    /// Fails if any of them fails to load, or if a first gid is 0 or shared, in which case nothing is returned.
    #[instrument(skip_all)]
    pub fn load_all(catalog: &Catalog, sources: &[(u32, &str)]) -> Result<(Self, Vec<ValidationReport>), LoadError> {
        let mut first_gids = HashSet::default();
        for (first_gid, path) in sources {
            if *first_gid == 0 {
                return Err(LoadError::ZeroFirstGid { path: String::from(*path) });
            }
            if !first_gids.insert(*first_gid) {
                return Err(LoadError::DuplicateFirstGid { first_gid: *first_gid });
            }
        }

        let built = sources
            .par_iter()
            .map(|(first_gid, path)| -> Result<_, LoadError> {
                let (index, report) = catalog.build(path)?;
                Ok((*first_gid, index, report))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        let mut library = Self::new();
        let mut reports = Vec::with_capacity(built.len());
        for (first_gid, index, report) in built {
            for warning in report.warnings() {
                log::warn!("{}: {warning}", index.name());
            }
            library.insert(first_gid, Snapshot::new(index));
            reports.push(report);
        }
        log::info!("Loaded {} tileset(s) into library", library.len());
        Ok((library, reports))
    }

    /// Adds a tileset starting at `first_gid`, which should be at least 1.
    /// Replaces and returns the tileset previously registered at that gid, if any.
    pub fn insert(&mut self, first_gid: u32, index: Snapshot) -> Option<Snapshot> {
        match self.entries.binary_search_by_key(&first_gid, |(gid, _)| *gid) {
            Ok(position) => Some(std::mem::replace(&mut self.entries[position].1, index)),
            Err(position) => {
                self.entries.insert(position, (first_gid, index));
                None
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tilesets with their first gids, in ascending gid order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Snapshot)> {
        self.entries.iter().map(|(first_gid, index)| (*first_gid, index))
    }

    pub fn by_name(&self, name: &str) -> Result<&Snapshot, NotFoundError> {
        self.entries
            .iter()
            .map(|(_, index)| index)
            .find(|index| index.name() == name)
            .ok_or_else(|| NotFoundError::Tileset { name: name.into() })
    }

    pub fn first_gid_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, index)| index.name() == name)
            .map(|(first_gid, _)| *first_gid)
    }

    /**
     * Finds the tile a map cell refers to.
     * Empty cells resolve to `None`. A gid that no tileset covers is an error.
     */
    pub fn resolve_gid(&self, raw: u32) -> Result<Option<ResolvedTile<'_>>, NotFoundError> {
        let gid = Gid(raw);
        if gid.is_empty() {
            return Ok(None);
        }
        let id = gid.id();
        let end = self.entries.partition_point(|(first_gid, _)| *first_gid <= id);
        let Some((first_gid, index)) = end.checked_sub(1).map(|position| &self.entries[position]) else {
            return Err(NotFoundError::Gid { gid: gid.0 });
        };
        let tile = index
            .by_id(id - first_gid)
            .map_err(|_| NotFoundError::Gid { gid: gid.0 })?;
        Ok(Some(ResolvedTile {
            tileset: index,
            tile,
            flags: gid.flags(),
        }))
    }
}
