//! Overlap detection between map objects.
//!
//! Detection runs in two phases:
//!
//! 1. **Broad phase** - a [`BroadPhase`] strategy proposes candidate pairs
//!    whose bounding boxes intersect. Pairs with disjoint boxes cannot share
//!    area, so pruning them never changes the result.
//! 2. **Narrow phase** - each candidate pair is intersected exactly. The
//!    metric of a pair is the area of the bounding rectangle of the
//!    intersection region, and a pair is reported when the metric exceeds
//!    the configured threshold.
//!
//! The narrow phase can run on the rayon thread pool. Results are always
//! returned in candidate order, so parallel and sequential runs agree.

use std::{collections::HashMap, ops::RangeInclusive};

use log::{debug, info, trace};
use rayon::prelude::*;

use mapsift_core::{
    catalog::SymbolCatalog,
    geometry::{Bounds, Region},
    identifier::{ObjectId, SymbolId},
    object::MapObject,
};

use crate::{config::OverlapConfig, extract::extract};

/// Two distinct objects whose regions overlap.
///
/// `object1` precedes `object2` in the object sequence the detector was given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapPair {
    object1: ObjectId,
    object2: ObjectId,
    symbol_id1: SymbolId,
    symbol_id2: SymbolId,
    overlap_metric: f64,
}

impl OverlapPair {
    pub fn new(
        object1: ObjectId,
        object2: ObjectId,
        symbol_id1: SymbolId,
        symbol_id2: SymbolId,
        overlap_metric: f64,
    ) -> Self {
        Self {
            object1,
            object2,
            symbol_id1,
            symbol_id2,
            overlap_metric,
        }
    }

    pub fn object1(&self) -> ObjectId {
        self.object1
    }

    pub fn object2(&self) -> ObjectId {
        self.object2
    }

    pub fn symbol_id1(&self) -> SymbolId {
        self.symbol_id1
    }

    pub fn symbol_id2(&self) -> SymbolId {
        self.symbol_id2
    }

    /// Area of the bounding rectangle of the intersection region
    pub fn overlap_metric(&self) -> f64 {
        self.overlap_metric
    }
}

/// An object prepared for overlap tests.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ObjectId,
    symbol_id: SymbolId,
    region: Region,
}

impl Shape {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn symbol_id(&self) -> SymbolId {
        self.symbol_id
    }

    pub fn bounds(&self) -> Bounds {
        self.region.bounds()
    }
}

/// Build shapes for every object that can take part in overlap analysis.
///
/// An object takes part when its symbol reference is numeric, names a symbol
/// of the catalog, and its coordinates enclose a region. Shapes keep the
/// order of `objects`.
pub fn shapes(objects: &[MapObject], catalog: &SymbolCatalog) -> Vec<Shape> {
    objects
        .iter()
        .filter_map(|object| {
            let symbol_id = object.symbol_id().filter(|id| catalog.contains(*id))?;
            let region = extract(object).path?.to_region()?;
            Some(Shape {
                id: object.id(),
                symbol_id,
                region,
            })
        })
        .collect()
}

/// Strategy for proposing candidate pairs from bounding boxes.
pub trait BroadPhase {
    /// Returns every pair `(i, j)` with `i < j` whose bounds intersect,
    /// sorted ascending and without duplicates.
    fn candidate_pairs(&self, bounds: &[Bounds]) -> Vec<(usize, usize)>;
}

/// Compares every pair of boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn candidate_pairs(&self, bounds: &[Bounds]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in bounds.iter().enumerate() {
            for (j, b) in bounds.iter().enumerate().skip(i + 1) {
                if a.intersects(b) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}

/// Boxes covering more cells than this are compared against every box
/// instead of being bucketed.
pub const MAX_CELLS_PER_BOX: u64 = 4096;

/// Buckets boxes into square grid cells and compares boxes sharing a cell.
///
/// A box spanning more than [`MAX_CELLS_PER_BOX`] cells is kept out of the
/// grid and tested against all other boxes, so memory stays bounded by the
/// number of boxes whatever the cell size.
#[derive(Debug, Clone, Copy)]
pub struct UniformGrid {
    cell_size: f64,
}

impl UniformGrid {
    /// Creates a grid with the given cell edge length.
    ///
    /// The size must be positive and finite; configuration validation
    /// guarantees this for configured grids.
    pub fn new(cell_size: f64) -> Self {
        Self { cell_size }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_range(&self, min: f64, max: f64) -> RangeInclusive<i64> {
        // Saturating float-to-int casts keep absurd coordinates in range.
        let first = (min / self.cell_size).floor() as i64;
        let last = (max / self.cell_size).floor() as i64;
        first..=last
    }

    /// Number of cells a box covers, saturating at `u64::MAX`.
    fn cell_count(&self, bounds: &Bounds) -> u64 {
        let span = |range: RangeInclusive<i64>| {
            range
                .end()
                .saturating_sub(*range.start())
                .unsigned_abs()
                .saturating_add(1)
        };
        span(self.cell_range(bounds.min_x(), bounds.max_x()))
            .saturating_mul(span(self.cell_range(bounds.min_y(), bounds.max_y())))
    }
}

impl BroadPhase for UniformGrid {
    fn candidate_pairs(&self, bounds: &[Bounds]) -> Vec<(usize, usize)> {
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        let mut oversized = Vec::new();
        for (index, b) in bounds.iter().enumerate() {
            if self.cell_count(b) > MAX_CELLS_PER_BOX {
                oversized.push(index);
                continue;
            }
            for cx in self.cell_range(b.min_x(), b.max_x()) {
                for cy in self.cell_range(b.min_y(), b.max_y()) {
                    cells.entry((cx, cy)).or_default().push(index);
                }
            }
        }

        let mut pairs = Vec::new();
        for members in cells.values() {
            for (k, &i) in members.iter().enumerate() {
                for &j in &members[k + 1..] {
                    if bounds[i].intersects(&bounds[j]) {
                        pairs.push((i, j));
                    }
                }
            }
        }

        for &i in &oversized {
            for (j, b) in bounds.iter().enumerate() {
                if j != i && bounds[i].intersects(b) {
                    pairs.push((i.min(j), i.max(j)));
                }
            }
        }

        // Grid members are pushed in index order, so every pair has i < j.
        pairs.sort_unstable();
        pairs.dedup();
        trace!(
            cells = cells.len(),
            oversized = oversized.len(),
            candidates = pairs.len();
            "Grid broad phase finished"
        );
        pairs
    }
}

/// Detect overlapping objects.
///
/// Returns pairs in enumeration order of `objects`. Pairs of objects that
/// share a symbol are never reported.
///
/// # Examples
///
/// ```
/// # use mapsift::{
/// #     catalog::SymbolCatalog, config::OverlapConfig, identifier::{ObjectId, SymbolId},
/// #     object::MapObject, overlap::detect, symbol::SymbolRecord,
/// # };
/// let catalog = SymbolCatalog::load(&[
///     SymbolRecord::new("1", "Building"),
///     SymbolRecord::new("2", "Forest"),
/// ]);
/// let objects = [
///     MapObject::new(ObjectId::new(0), SymbolId::new(1), "0 0;100 0;100 100;0 100"),
///     MapObject::new(ObjectId::new(1), SymbolId::new(2), "50 50;150 50;150 150;50 150"),
/// ];
///
/// let pairs = detect(&objects, &catalog, &OverlapConfig::default());
/// assert_eq!(pairs.len(), 1);
/// assert!((pairs[0].overlap_metric() - 2500.0).abs() < 1e-3);
/// ```
pub fn detect(
    objects: &[MapObject],
    catalog: &SymbolCatalog,
    config: &OverlapConfig,
) -> Vec<OverlapPair> {
    let shapes = shapes(objects, catalog);
    match config.grid_cell_size() {
        Some(cell_size) => detect_shapes(&shapes, &UniformGrid::new(cell_size), config),
        None => detect_shapes(&shapes, &AllPairs, config),
    }
}

/// Detect overlaps among prepared shapes with the given broad phase.
pub fn detect_shapes(
    shapes: &[Shape],
    broad_phase: &impl BroadPhase,
    config: &OverlapConfig,
) -> Vec<OverlapPair> {
    info!(shapes = shapes.len(), parallel = config.parallel(); "Detecting overlaps");

    let bounds: Vec<Bounds> = shapes.iter().map(Shape::bounds).collect();
    let candidates: Vec<(usize, usize)> = broad_phase
        .candidate_pairs(&bounds)
        .into_iter()
        .filter(|&(i, j)| shapes[i].symbol_id != shapes[j].symbol_id)
        .collect();
    debug!(candidates = candidates.len(); "Broad phase finished");

    let threshold = config.min_overlap_area();
    let test = |&(i, j): &(usize, usize)| narrow_phase(&shapes[i], &shapes[j], threshold);

    let pairs: Vec<OverlapPair> = if config.parallel() {
        candidates.par_iter().filter_map(test).collect()
    } else {
        candidates.iter().filter_map(test).collect()
    };

    info!(overlaps = pairs.len(); "Overlap detection finished");
    pairs
}

fn narrow_phase(a: &Shape, b: &Shape, threshold: f64) -> Option<OverlapPair> {
    let bounds = a.region.intersection_bounds(&b.region)?;
    let metric = bounds.area();
    if metric <= threshold {
        return None;
    }

    trace!(object1 = a.id.index(), object2 = b.id.index(), metric; "Overlap found");
    Some(OverlapPair::new(a.id, b.id, a.symbol_id, b.symbol_id, metric))
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use mapsift_core::{geometry::Point, symbol::SymbolRecord};

    use super::*;

    fn catalog() -> SymbolCatalog {
        SymbolCatalog::load(&[
            SymbolRecord::new("1", "Building"),
            SymbolRecord::new("2", "Forest"),
            SymbolRecord::new("3", "Road"),
        ])
    }

    fn square(id: usize, symbol: i32, x: f64, y: f64, side: f64) -> MapObject {
        MapObject::new(
            ObjectId::new(id),
            SymbolId::new(symbol),
            format!("{x} {y};{} {y};{} {};{x} {}", x + side, x + side, y + side, y + side),
        )
    }

    fn ids(pairs: &[OverlapPair]) -> Vec<(usize, usize)> {
        pairs
            .iter()
            .map(|p| (p.object1().index(), p.object2().index()))
            .collect()
    }

    #[test]
    fn test_detects_overlap_with_metric() {
        let objects = [square(0, 1, 0.0, 0.0, 100.0), square(1, 2, 60.0, 70.0, 100.0)];
        let pairs = detect(&objects, &catalog(), &OverlapConfig::default());

        assert_eq!(ids(&pairs), [(0, 1)]);
        assert_eq!(pairs[0].symbol_id1(), SymbolId::new(1));
        assert_eq!(pairs[0].symbol_id2(), SymbolId::new(2));
        assert!(approx_eq!(f64, pairs[0].overlap_metric(), 1200.0, epsilon = 1e-3));
    }

    #[test]
    fn test_small_overlaps_below_threshold() {
        // 9 x 9 intersection stays under the default threshold of 100.
        let objects = [square(0, 1, 0.0, 0.0, 100.0), square(1, 2, 91.0, 91.0, 100.0)];
        assert!(detect(&objects, &catalog(), &OverlapConfig::default()).is_empty());

        let config = OverlapConfig::default().with_min_overlap_area(80.0);
        assert_eq!(ids(&detect(&objects, &catalog(), &config)), [(0, 1)]);
    }

    #[test]
    fn test_same_symbol_never_paired() {
        let objects = [square(0, 1, 0.0, 0.0, 100.0), square(1, 1, 10.0, 10.0, 100.0)];
        assert!(detect(&objects, &catalog(), &OverlapConfig::default()).is_empty());
    }

    #[test]
    fn test_unusable_objects_skipped() {
        let objects = [
            square(0, 1, 0.0, 0.0, 100.0),
            // Symbol not in the catalog
            square(1, 9, 0.0, 0.0, 100.0),
            // No symbol reference
            MapObject::unresolved(ObjectId::new(2), "0 0;100 0;100 100"),
            // Fewer than three points
            MapObject::new(ObjectId::new(3), SymbolId::new(2), "0 0;100 100"),
            // No coordinates at all
            MapObject::new(ObjectId::new(4), SymbolId::new(3), ""),
            square(5, 3, 50.0, 50.0, 100.0),
        ];

        let pairs = detect(&objects, &catalog(), &OverlapConfig::default());
        assert_eq!(ids(&pairs), [(0, 5)]);
    }

    #[test]
    fn test_touching_objects_do_not_overlap() {
        let objects = [square(0, 1, 0.0, 0.0, 100.0), square(1, 2, 100.0, 0.0, 100.0)];
        let config = OverlapConfig::default().with_min_overlap_area(0.0);
        assert!(detect(&objects, &catalog(), &config).is_empty());
    }

    #[test]
    fn test_enumeration_order() {
        let objects = [
            square(0, 1, 0.0, 0.0, 100.0),
            square(1, 2, 20.0, 20.0, 100.0),
            square(2, 3, 40.0, 40.0, 100.0),
        ];
        let pairs = detect(&objects, &catalog(), &OverlapConfig::default());
        assert_eq!(ids(&pairs), [(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_all_pairs_candidates() {
        let bounds = [
            Bounds::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
            Bounds::new(Point::new(5.0, 5.0), Point::new(15.0, 15.0)),
            Bounds::new(Point::new(100.0, 100.0), Point::new(110.0, 110.0)),
            Bounds::new(Point::new(9.0, 0.0), Point::new(12.0, 2.0)),
        ];
        assert_eq!(AllPairs.candidate_pairs(&bounds), [(0, 1), (0, 3), (1, 3)]);
    }

    #[test]
    fn test_grid_with_oversized_box() {
        // A full-map area against a 1-unit grid would cover 4e12 cells.
        let objects = [
            square(0, 1, 0.0, 0.0, 2_000_000.0),
            square(1, 2, 10.0, 10.0, 490.0),
        ];
        let config = OverlapConfig::default().with_grid_cell_size(1.0);

        let pairs = detect(&objects, &catalog(), &config);
        assert_eq!(ids(&pairs), [(0, 1)]);
        assert!(approx_eq!(f64, pairs[0].overlap_metric(), 490.0 * 490.0, epsilon = 1e-3));
    }

    #[test]
    fn test_grid_oversized_candidates_match_all_pairs() {
        let bounds = [
            Bounds::new(Point::new(5.0, 5.0), Point::new(6.0, 6.0)),
            Bounds::new(Point::new(0.0, 0.0), Point::new(1_000.0, 1_000.0)),
            Bounds::new(Point::new(-500.0, 900.0), Point::new(2_000.0, 5_000.0)),
            Bounds::new(Point::new(1_500.0, 4_000.0), Point::new(1_501.0, 4_001.0)),
            Bounds::new(Point::new(3_000.0, 3_000.0), Point::new(3_001.0, 3_001.0)),
        ];
        let grid = UniformGrid::new(1.0);

        let pairs = grid.candidate_pairs(&bounds);
        assert_eq!(pairs, [(0, 1), (1, 2), (2, 3)]);
        assert_eq!(pairs, AllPairs.candidate_pairs(&bounds));
    }

    #[test]
    fn test_grid_candidates_match_all_pairs() {
        let bounds = [
            Bounds::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0)),
            Bounds::new(Point::new(5.0, 5.0), Point::new(35.0, 15.0)),
            Bounds::new(Point::new(-40.0, -40.0), Point::new(-30.0, -30.0)),
            Bounds::new(Point::new(30.0, 0.0), Point::new(60.0, 40.0)),
            Bounds::new(Point::new(-35.0, -35.0), Point::new(1.0, 1.0)),
        ];
        let grid = UniformGrid::new(8.0);
        assert_eq!(grid.candidate_pairs(&bounds), AllPairs.candidate_pairs(&bounds));
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        fn objects_strategy() -> impl Strategy<Value = Vec<MapObject>> {
            prop::collection::vec(
                (1..=3i32, -500i32..500, -500i32..500, 20i32..300),
                0..12,
            )
            .prop_map(|specs| {
                specs
                    .into_iter()
                    .enumerate()
                    .map(|(id, (symbol, x, y, side))| {
                        square(id, symbol, f64::from(x), f64::from(y), f64::from(side))
                    })
                    .collect()
            })
        }

        fn normalized(pairs: &[OverlapPair]) -> Vec<(usize, usize, f64)> {
            let mut out: Vec<_> = pairs
                .iter()
                .map(|p| {
                    let (a, b) = (p.object1().index(), p.object2().index());
                    (a.min(b), a.max(b), p.overlap_metric())
                })
                .collect();
            out.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
            out
        }

        proptest! {
            #[test]
            fn detection_is_symmetric_under_permutation(
                objects in objects_strategy(),
                seed in any::<u64>(),
            ) {
                let config = OverlapConfig::default();
                let forward = detect(&objects, &catalog(), &config);

                // Deterministic shuffle driven by the seed.
                let mut shuffled = objects.clone();
                let mut state = seed;
                for i in (1..shuffled.len()).rev() {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    let j = (state >> 33) as usize % (i + 1);
                    shuffled.swap(i, j);
                }
                let permuted = detect(&shuffled, &catalog(), &config);

                let a = normalized(&forward);
                let b = normalized(&permuted);
                prop_assert_eq!(a.len(), b.len());
                for (x, y) in a.iter().zip(&b) {
                    prop_assert_eq!((x.0, x.1), (y.0, y.1));
                    prop_assert!((x.2 - y.2).abs() <= 1e-6 * (1.0 + x.2));
                }
            }

            #[test]
            fn parallel_matches_sequential(objects in objects_strategy()) {
                let sequential = OverlapConfig::default().with_parallel(false);
                let parallel = OverlapConfig::default().with_parallel(true);

                prop_assert_eq!(
                    detect(&objects, &catalog(), &sequential),
                    detect(&objects, &catalog(), &parallel)
                );
            }

            #[test]
            fn grid_matches_all_pairs(objects in objects_strategy(), cell in 10.0f64..400.0) {
                let shapes = shapes(&objects, &catalog());
                let config = OverlapConfig::default();

                prop_assert_eq!(
                    detect_shapes(&shapes, &UniformGrid::new(cell), &config),
                    detect_shapes(&shapes, &AllPairs, &config)
                );
            }

            #[test]
            fn no_pair_shares_a_symbol_or_object(objects in objects_strategy()) {
                for pair in detect(&objects, &catalog(), &OverlapConfig::default()) {
                    prop_assert_ne!(pair.object1(), pair.object2());
                    prop_assert_ne!(pair.symbol_id1(), pair.symbol_id2());
                    prop_assert!(pair.overlap_metric() > 100.0);
                }
            }
        }
    }
}
