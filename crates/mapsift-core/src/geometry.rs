//! Planar geometry for overlap analysis.
//!
//! This module provides the geometric types mapsift uses to reason about
//! where map objects lie on the sheet.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in map space
//! - [`Bounds`] - An axis-aligned rectangle defined by minimum and maximum coordinates
//! - [`Path`] - A sequence of points built with move/line-to steps, optionally closed
//! - [`Region`] - The area enclosed by a closed path, used for intersection tests
//!
//! # Coordinate System
//!
//! Map documents store coordinates as integers in 1/1000 mm of paper, with
//! the y-axis pointing down:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Values routinely exceed the exact range of `f32`, so all coordinates are `f64`.

use geo::{BooleanOps, BoundingRect, Coord, LineString, Polygon};

/// A 2D point in map coordinate space.
///
/// # Examples
///
/// ```
/// # use mapsift_core::geometry::Point;
/// let p = Point::new(10.0, -20.5);
/// assert_eq!(p.x(), 10.0);
/// assert_eq!(p.y(), -20.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }
}

impl From<Point> for Coord<f64> {
    fn from(point: Point) -> Self {
        Coord {
            x: point.x,
            y: point.y,
        }
    }
}

/// An axis-aligned rectangle with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    /// Creates bounds from two opposite corners, in any order
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Returns the smallest bounds containing all points, or `None` for no points.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mapsift_core::geometry::{Bounds, Point};
    /// let points = [Point::new(3.0, 1.0), Point::new(-1.0, 4.0), Point::new(2.0, 2.0)];
    /// let bounds = Bounds::from_points(points).unwrap();
    /// assert_eq!(bounds.min_x(), -1.0);
    /// assert_eq!(bounds.max_y(), 4.0);
    /// assert_eq!(bounds.area(), 12.0);
    ///
    /// assert!(Bounds::from_points(std::iter::empty()).is_none());
    /// ```
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let start = Self::new(first, first);

        Some(points.fold(start, |bounds, p| Self {
            min_x: bounds.min_x.min(p.x),
            min_y: bounds.min_y.min(p.y),
            max_x: bounds.max_x.max(p.x),
            max_y: bounds.max_y.max(p.y),
        }))
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f64 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f64 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f64 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f64 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the area of the rectangle
    pub fn area(self) -> f64 {
        self.width() * self.height()
    }

    /// Checks whether two bounds share at least one point.
    ///
    /// Touching edges count as intersecting.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

/// A polyline built from move and line-to steps.
///
/// A path starts empty. The first point is added with [`Path::move_to`],
/// every further point with [`Path::line_to`]. Closing the path joins the
/// last point back to the first and turns it into a polygon boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    points: Vec<Point>,
    closed: bool,
}

impl Path {
    /// Creates an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the path at `point`, discarding anything added before.
    pub fn move_to(&mut self, point: Point) {
        self.points.clear();
        self.closed = false;
        self.points.push(point);
    }

    /// Adds a straight segment to `point`.
    ///
    /// On an empty path this behaves like [`Path::move_to`].
    pub fn line_to(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Closes the path
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Returns the points in insertion order
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns true once [`Path::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no point has been added
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the bounds of all points, or `None` for an empty path
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points.iter().copied())
    }

    /// Builds the region enclosed by this path.
    ///
    /// Open paths are treated as if closed. Returns `None` when fewer than
    /// three points are present, since such a path encloses nothing.
    pub fn to_region(&self) -> Option<Region> {
        if self.points.len() < 3 {
            return None;
        }

        let bounds = self.bounds()?;
        let ring: LineString<f64> = self.points.iter().copied().map(Coord::from).collect();

        Some(Region {
            polygon: Polygon::new(ring, Vec::new()),
            bounds,
        })
    }
}

/// The area enclosed by a closed [`Path`].
#[derive(Debug, Clone)]
pub struct Region {
    polygon: Polygon<f64>,
    bounds: Bounds,
}

impl Region {
    /// Returns the bounding rectangle of the region's boundary
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Intersects two regions and returns the bounding rectangle of the result.
    ///
    /// Returns `None` when the regions do not share any area. Regions that only
    /// touch along an edge or at a corner have an empty intersection.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mapsift_core::geometry::{Path, Point};
    /// fn square(x: f64, y: f64, side: f64) -> Path {
    ///     let mut path = Path::new();
    ///     path.move_to(Point::new(x, y));
    ///     path.line_to(Point::new(x + side, y));
    ///     path.line_to(Point::new(x + side, y + side));
    ///     path.line_to(Point::new(x, y + side));
    ///     path.close();
    ///     path
    /// }
    ///
    /// let a = square(0.0, 0.0, 10.0).to_region().unwrap();
    /// let b = square(5.0, 5.0, 10.0).to_region().unwrap();
    /// let overlap = a.intersection_bounds(&b).unwrap();
    /// assert!((overlap.area() - 25.0).abs() < 1e-6);
    ///
    /// let far = square(50.0, 50.0, 10.0).to_region().unwrap();
    /// assert!(a.intersection_bounds(&far).is_none());
    /// ```
    pub fn intersection_bounds(&self, other: &Region) -> Option<Bounds> {
        if !self.bounds.intersects(&other.bounds) {
            return None;
        }

        let rect = self.polygon.intersection(&other.polygon).bounding_rect()?;
        let bounds = Bounds::new(
            Point::new(rect.min().x, rect.min().y),
            Point::new(rect.max().x, rect.max().y),
        );

        (bounds.area() > 0.0).then_some(bounds)
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn rect_strategy() -> impl Strategy<Value = Path> {
        (
            -1000.0f64..1000.0,
            -1000.0f64..1000.0,
            1.0f64..500.0,
            1.0f64..500.0,
        )
            .prop_map(|(x, y, w, h)| {
                let mut path = Path::new();
                path.move_to(Point::new(x, y));
                path.line_to(Point::new(x + w, y));
                path.line_to(Point::new(x + w, y + h));
                path.line_to(Point::new(x, y + h));
                path.close();
                path
            })
    }

    proptest! {
        #[test]
        fn intersection_of_rectangles_matches_bounds_overlap(a in rect_strategy(), b in rect_strategy()) {
            let ra = a.to_region().unwrap();
            let rb = b.to_region().unwrap();
            let (ba, bb) = (ra.bounds(), rb.bounds());

            let w = ba.max_x().min(bb.max_x()) - ba.min_x().max(bb.min_x());
            let h = ba.max_y().min(bb.max_y()) - ba.min_y().max(bb.min_y());

            match ra.intersection_bounds(&rb) {
                Some(overlap) => {
                    prop_assert!(w > 0.0 && h > 0.0);
                    prop_assert!((overlap.area() - w * h).abs() <= 1e-3 * (1.0 + w + h));
                }
                None => prop_assert!(w <= 1e-4 || h <= 1e-4),
            }
        }

        #[test]
        fn intersection_is_contained_in_both(a in rect_strategy(), b in rect_strategy()) {
            let ra = a.to_region().unwrap();
            let rb = b.to_region().unwrap();

            if let Some(overlap) = ra.intersection_bounds(&rb) {
                for bounds in [ra.bounds(), rb.bounds()] {
                    prop_assert!(overlap.min_x() >= bounds.min_x() - 1e-6);
                    prop_assert!(overlap.max_x() <= bounds.max_x() + 1e-6);
                    prop_assert!(overlap.min_y() >= bounds.min_y() - 1e-6);
                    prop_assert!(overlap.max_y() <= bounds.max_y() + 1e-6);
                }
            }
        }
    }
}
