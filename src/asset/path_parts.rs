use std::fmt;
use derive_more::*;

/**
 * Deconstructed path to a descriptor file.
 */
#[derive(Clone, Eq, PartialEq, Default, Debug, Hash)]
pub struct AssetPath {
    pub protocol: String,
    pub prefix: Option<String>,
    pub body: String,
    pub extension: String,
}

impl AssetPath {

    pub fn parse(path: &str, default_protocol: Option<&str>) -> Result<Self, PathError> {
        let protocol: Option<&str>;
        let mut remainder = path;

        // Reads protocol
        match remainder.split_once("://") {
            Some((left, right)) => {
                protocol = Some(left);
                remainder = right;
            },
            None => protocol = None,
        };
        let Some(protocol) = protocol.or(default_protocol) else {
            return Err(PathError::NoDefaultProtocol)
        };

        // Reads body and extension. Only dots in the file name count.
        let file_start = remainder.rfind(['/', '\\']).map(|idx| idx + 1).unwrap_or(0);
        let (body, extension) = match remainder[file_start..].rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() && !extension.is_empty() => {
                (&remainder[..file_start + stem.len()], extension)
            },
            _ => return Err(PathError::PathMissingExtension { path: path.into() }),
        };

        Ok(Self {
            protocol: protocol.into(),
            prefix: None,
            body: body.into(),
            extension: extension.into(),
        })
    }

    /// Prefix, body and extension. No protocol.
    pub fn without_protocol(&self) -> String {
        match self.prefix.as_deref() {
            Some(prefix) => format!("{}/{}.{}", prefix, self.body, self.extension),
            None => format!("{}.{}", self.body, self.extension),
        }
    }

    /// Parent directory of this file, prefix included.
    /// None if it's at the root.
    pub fn parent(&self) -> Option<String> {
        let full = self.without_protocol();
        let (parent, _) = full.rsplit_once('/')?;
        if parent.is_empty() { return None }
        Some(parent.into())
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.without_protocol())
    }
}

/// True if a relative asset path could leave the directory it is resolved against.
/// Rooted paths, drive letters and `..` segments all count.
pub fn escapes_root(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') || is_drive(path) {
        return true;
    }
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Path starts with a drive root, as in `C:/` or `C:\`.
fn is_drive(path: &str) -> bool {
    let mut chars = path.chars();
    let letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let colon = chars.next() == Some(':');
    let rest = chars.as_str();
    letter && colon && (rest.is_empty() || rest.starts_with(['/', '\\']))
}

/// Joins a relative asset path onto a directory.
pub fn join_asset_path(parent: Option<&str>, path: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}/{path}"),
        None => String::from(path),
    }
}

#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum PathError {
    #[display(fmt="No default protocol")]
    NoDefaultProtocol,
    #[display(fmt="No such protocol '{protocol}'")]
    NoSuchProtocol { protocol: String },
    #[display(fmt="Path '{path}' is missing an extension")]
    PathMissingExtension { path: String },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_with_default_protocol() {
        let path = AssetPath::parse("map/kenney-dungeon-tileset.tsx", Some("file")).unwrap();
        assert_eq!("file", path.protocol);
        assert_eq!("map/kenney-dungeon-tileset", path.body);
        assert_eq!("tsx", path.extension);
        assert_eq!(Some(String::from("map")), path.parent());
        assert_eq!("file://map/kenney-dungeon-tileset.tsx", path.to_string());
    }

    #[test]
    fn parse_explicit_protocol_and_dotted_dirs() {
        let mut path = AssetPath::parse("mem://./tiles.v2/dungeon.tsx", None).unwrap();
        assert_eq!("mem", path.protocol);
        assert_eq!("./tiles.v2/dungeon", path.body);
        path.prefix = Some(String::from("assets"));
        assert_eq!("assets/./tiles.v2/dungeon.tsx", path.without_protocol());
        assert_eq!(Some(String::from("assets/./tiles.v2")), path.parent());
    }

    #[test]
    fn parse_failures() {
        assert_eq!(Err(PathError::NoDefaultProtocol), AssetPath::parse("dungeon.tsx", None));
        assert!(matches!(
            AssetPath::parse("file://tiles.v2/dungeon", None),
            Err(PathError::PathMissingExtension { .. })
        ));
        assert!(matches!(
            AssetPath::parse("file://.tsx", None),
            Err(PathError::PathMissingExtension { .. })
        ));
    }

    #[test]
    fn root_at_top_level() {
        let path = AssetPath::parse("dungeon.tsx", Some("file")).unwrap();
        assert_eq!(None, path.parent());
    }

    #[test]
    fn traversal() {
        assert!(!escapes_root("isometric_dungeon/barrel_E.png"));
        assert!(!escapes_root("a/..b/c.png"));
        assert!(escapes_root("../secrets.png"));
        assert!(escapes_root("isometric_dungeon/../../etc/passwd"));
        assert!(escapes_root("a\\..\\b.png"));
        assert!(escapes_root("/etc/passwd"));
        assert!(escapes_root("C:/Windows/x.png"));
        assert!(escapes_root("d:\\tiles\\x.png"));
        assert!(!escapes_root("a:b.png"));
        assert!(!escapes_root("tiles/a:b.png"));
        assert!(!escapes_root("mixed:colon_N.png"));
    }
}
