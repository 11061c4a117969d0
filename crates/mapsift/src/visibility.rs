//! Visibility resolution: which object of an overlapping pair gives way.
//!
//! For each [`OverlapPair`] the object whose symbol has the lower priority is
//! selected for hiding. On equal priorities the second object of the pair
//! gives way. Objects whose symbol id falls into an exemption band are never
//! hidden.

use std::collections::BTreeSet;

use log::{debug, info, trace};

use mapsift_core::{
    catalog::SymbolCatalog,
    identifier::{ObjectId, SymbolId},
};

use crate::overlap::OverlapPair;

/// Symbol id bands whose objects are never hidden.
///
/// Each band `[low, high]` is exclusive on both ends.
///
/// # Examples
///
/// ```
/// # use mapsift::{identifier::SymbolId, visibility::ExemptionBands};
/// let bands = ExemptionBands::default();
/// assert!(bands.contains(SymbolId::new(5)));
/// assert!(!bands.contains(SymbolId::new(19)));
/// assert!(bands.contains(SymbolId::new(50)));
/// assert!(!bands.contains(SymbolId::new(70)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExemptionBands {
    bands: Vec<[i32; 2]>,
}

impl ExemptionBands {
    /// Creates bands from `[low, high]` pairs.
    pub fn new(bands: impl IntoIterator<Item = [i32; 2]>) -> Self {
        Self {
            bands: bands.into_iter().collect(),
        }
    }

    /// Bands that exempt nothing
    pub fn none() -> Self {
        Self { bands: Vec::new() }
    }

    pub fn bands(&self) -> &[[i32; 2]] {
        &self.bands
    }

    /// Returns true if `id` lies strictly inside one of the bands.
    pub fn contains(&self, id: SymbolId) -> bool {
        let value = id.value();
        self.bands
            .iter()
            .any(|&[low, high]| low < value && value < high)
    }
}

impl Default for ExemptionBands {
    fn default() -> Self {
        Self::new([[0, 19], [43, 65]])
    }
}

/// Objects selected for hiding, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HideSet {
    objects: BTreeSet<ObjectId>,
}

impl HideSet {
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates over the hidden objects in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().copied()
    }
}

impl FromIterator<ObjectId> for HideSet {
    fn from_iter<T: IntoIterator<Item = ObjectId>>(iter: T) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

/// Decide which objects to hide.
///
/// Pairs that name the same object twice or the same symbol twice are
/// ignored.
///
/// # Examples
///
/// ```
/// # use mapsift::{
/// #     catalog::SymbolCatalog, identifier::{ObjectId, SymbolId}, overlap::OverlapPair,
/// #     symbol::SymbolRecord, visibility::{ExemptionBands, resolve},
/// # };
/// let catalog = SymbolCatalog::load(&[
///     SymbolRecord::new("301", "Building"),
///     SymbolRecord::new("405", "Forest"),
/// ]);
/// let pair = OverlapPair::new(
///     ObjectId::new(0),
///     ObjectId::new(1),
///     SymbolId::new(405),
///     SymbolId::new(301),
///     250.0,
/// );
///
/// let hidden = resolve(&[pair], &catalog, &ExemptionBands::default());
/// assert_eq!(hidden.iter().collect::<Vec<_>>(), [ObjectId::new(0)]);
/// ```
pub fn resolve(
    overlaps: &[OverlapPair],
    catalog: &SymbolCatalog,
    exemptions: &ExemptionBands,
) -> HideSet {
    info!(overlaps = overlaps.len(); "Resolving visibility");

    let mut exempted = 0usize;
    let hidden: HideSet = overlaps
        .iter()
        .filter(|pair| {
            pair.object1() != pair.object2() && pair.symbol_id1() != pair.symbol_id2()
        })
        .filter_map(|pair| {
            let p1 = catalog.priority_of(pair.symbol_id1());
            let p2 = catalog.priority_of(pair.symbol_id2());
            let (candidate, symbol_id) = if p1 >= p2 {
                (pair.object2(), pair.symbol_id2())
            } else {
                (pair.object1(), pair.symbol_id1())
            };

            if exemptions.contains(symbol_id) {
                trace!(object = candidate.index(), symbol = symbol_id.value(); "Object exempt from hiding");
                exempted += 1;
                return None;
            }

            trace!(object = candidate.index(), p1, p2; "Object selected for hiding");
            Some(candidate)
        })
        .collect();

    debug!(hidden = hidden.len(), exempted; "Visibility resolved");
    hidden
}
