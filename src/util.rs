use fxhash::{FxHashMap, FxHashSet};

/**
 * Hash map with a fast non-cryptographically secure hash function.
 */
pub type HashMap<K, V> = FxHashMap<K, V>;

/**
 * Hash set with a fast non-cryptographically secure hash function.
 */
pub type HashSet<V> = FxHashSet<V>;

/**
 * Hash map whose hash function is only suitable for small int types.
 * Outputs the original integer when used.
 */
pub type IntMap<K, V> = identity_hash::IntMap<K, V>;

/// Fixture used by unit tests across the crate.
#[cfg(test)]
pub(crate) const DUNGEON_TSX: &str = include_str!("../assets/kenney-dungeon-tileset.tsx");

#[cfg(test)]
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
