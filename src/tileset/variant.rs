use crate::{Orientation, TileDefinition};

/// Tiles sharing one semantic name, at most one per [`Orientation`].
/// Borrowed from the index that produced it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct VariantGroup<'a> {
    semantic_name: &'a str,
    slots: [Option<&'a TileDefinition>; 5],
}

impl<'a> VariantGroup<'a> {

    pub(crate) fn new(semantic_name: &'a str, slots: [Option<&'a TileDefinition>; 5]) -> Self {
        Self { semantic_name, slots }
    }

    pub fn semantic_name(&self) -> &'a str {
        self.semantic_name
    }

    /// Tile rendered with the given orientation, if present.
    pub fn get(&self, orientation: Orientation) -> Option<&'a TileDefinition> {
        self.slots[orientation.slot()]
    }

    /// Number of orientations present.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present members in N, E, S, W, none order.
    pub fn iter(&self) -> impl Iterator<Item = (Orientation, &'a TileDefinition)> + 'a {
        let slots = self.slots;
        Orientation::ALL
            .into_iter()
            .filter_map(move |orientation| slots[orientation.slot()].map(|tile| (orientation, tile)))
    }

    pub fn orientations(&self) -> impl Iterator<Item = Orientation> + 'a {
        self.iter().map(|(orientation, _)| orientation)
    }

    /// Cardinal orientations absent from this group.
    pub fn missing(&self) -> Vec<Orientation> {
        Orientation::CARDINALS
            .into_iter()
            .filter(|orientation| self.get(*orientation).is_none())
            .collect()
    }

    /// True if all four cardinal orientations are present.
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}
