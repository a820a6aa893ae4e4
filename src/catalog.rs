use std::sync::{Arc, PoisonError, RwLock};
use derive_more::*;
use tracing::instrument;
use crate::{AssetPath, CatalogConfig, FileProtocol, HashMap, ParseError, PathError, Protocol, Tileset, TilesetIndex, ValidationError, ValidationReport};

/// Shared, immutable view of a loaded tileset.
pub type Snapshot = Arc<TilesetIndex>;

/**
 * Holds the active [`TilesetIndex`] of one tileset and replaces it on reload.
 * Readers take a [`Snapshot`] and perform lookups on it without further locking.
 * A reload publishes a complete new snapshot, so readers see either the old or the new one.
 */
pub struct Catalog {
    config: CatalogConfig,
    protocols: HashMap<String, Arc<dyn Protocol>>,
    current: RwLock<Option<Snapshot>>,
}

impl Catalog {

    pub fn new(config: CatalogConfig) -> Self {
        Self::builder()
            .config(config)
            .protocol(FileProtocol)
            .build()
    }

    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn state(&self) -> CatalogState {
        match self.snapshot() {
            Some(_) => CatalogState::Loaded,
            None => CatalogState::Unloaded,
        }
    }

    /// The currently published index, if any.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /**
     * Reads, parses, validates and indexes a descriptor, then publishes it.
     * On failure the previously published snapshot, if any, stays active.
     * Returns the validation report, which only holds warnings on success.
     */
    pub fn load(&self, path: impl AsRef<str>) -> Result<ValidationReport, LoadError> {
        let path = path.as_ref();
        self.finish_load(path, self.build(path))
    }

    /// Same as [`Catalog::load`], for bytes the caller already has.
    /// `path` locates the descriptor so that asset paths can be resolved against it.
    pub fn load_bytes(&self, bytes: &[u8], path: impl AsRef<str>) -> Result<ValidationReport, LoadError> {
        let path = path.as_ref();
        let built = self
            .asset_path(path)
            .map_err(LoadError::from)
            .and_then(|asset_path| self.index_bytes(bytes, &asset_path));
        self.finish_load(path, built)
    }

    /// Logs the outcome of a load and publishes the index if there is one.
    fn finish_load(
        &self,
        path: &str,
        built: Result<(TilesetIndex, ValidationReport), LoadError>,
    ) -> Result<ValidationReport, LoadError> {
        match built {
            Ok((index, report)) => {
                for warning in report.warnings() {
                    log::warn!("{path}: {warning}");
                }
                self.publish(index);
                Ok(report)
            },
            Err(err) => {
                log::error!("Failed to load tileset {path}: {err}");
                Err(err)
            },
        }
    }

    /// Reads and indexes a descriptor without publishing it.
    #[instrument(skip_all)]
    pub fn build(&self, path: &str) -> Result<(TilesetIndex, ValidationReport), LoadError> {
        let asset_path = self.asset_path(path)?;
        let protocol = match self.protocols.get(&asset_path.protocol) {
            Some(protocol) => protocol.clone(),
            None => return Err(PathError::NoSuchProtocol { protocol: asset_path.protocol }.into()),
        };
        let bytes = protocol.read(&asset_path).map_err(|err| LoadError::Read {
            path: asset_path.to_string(),
            message: format!("{err:#}"),
        })?;
        self.index_bytes(&bytes, &asset_path)
    }

    fn asset_path(&self, path: &str) -> Result<AssetPath, PathError> {
        let mut asset_path = AssetPath::parse(path, Some(&self.config.default_protocol))?;
        asset_path.prefix = self.config.path_prefix.clone();
        Ok(asset_path)
    }

    fn index_bytes(&self, bytes: &[u8], path: &AssetPath) -> Result<(TilesetIndex, ValidationReport), LoadError> {
        let tileset = Tileset::from_bytes(bytes)?.with_source_dir(path.parent());
        log::trace!("Parsed {path}");
        let (index, report) = TilesetIndex::build(tileset, &self.config)?;
        Ok((index, report))
    }

    fn publish(&self, index: TilesetIndex) {
        log::info!("Publishing tileset '{}' with {} tile(s)", index.name(), index.len());
        let snapshot = Arc::new(index);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(snapshot);
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

/// Builds a [`Catalog`].
#[derive(Default)]
pub struct CatalogBuilder {
    config: CatalogConfig,
    protocols: HashMap<String, Arc<dyn Protocol>>,
}

impl CatalogBuilder {

    pub fn config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a protocol for reading descriptor bytes.
    pub fn protocol(mut self, protocol: impl Protocol) -> Self {
        let name = String::from(protocol.name());
        self.protocols.insert(name, Arc::new(protocol));
        self
    }

    /// Adds a protocol and uses it for paths that don't name one.
    pub fn default_protocol(mut self, protocol: impl Protocol) -> Self {
        self.config.default_protocol = String::from(protocol.name());
        self.protocol(protocol)
    }

    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.path_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> Catalog {
        Catalog {
            config: self.config,
            protocols: self.protocols,
            current: RwLock::new(None),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CatalogState {
    Unloaded,
    Loaded,
}

#[derive(Error, Display, From, Debug)]
pub enum LoadError {
    #[display(fmt="{_0}")]
    Path(PathError),
    #[display(fmt="Failed to read {path}: {message}")]
    #[from(ignore)]
    Read { path: String, message: String },
    #[display(fmt="{_0}")]
    Parse(ParseError),
    #[display(fmt="{_0}")]
    Validation(ValidationError),
    #[display(fmt="First gid of {path} is 0, first gids start at 1")]
    #[from(ignore)]
    ZeroFirstGid { path: String },
    #[display(fmt="First gid {first_gid} is used by more than one tileset")]
    #[from(ignore)]
    DuplicateFirstGid { first_gid: u32 },
}
