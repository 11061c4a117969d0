//! Geometry extraction: from coordinate text to closed paths.
//!
//! Map objects store their outline as text. Two layouts occur in practice:
//!
//! - `;`-separated entries, each `x y [flags]`, e.g. `0 0;100 0 1;100 100;`
//! - a flat run of numbers read pairwise, e.g. `0 0 100 0 100 100`
//!
//! Flag tokens after `x y` mark curve control points and similar details;
//! they are ignored and every segment is treated as straight.

use log::warn;
use thiserror::Error;

use mapsift_core::{
    geometry::{Path, Point},
    object::MapObject,
};

/// Why a coordinate entry could not be turned into a point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("missing y coordinate")]
    MissingY,

    #[error("`{0}` is not a number")]
    NotANumber(String),

    #[error("`{0}` is not a finite number")]
    NotFinite(String),
}

/// A coordinate entry that was dropped during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCoordinate {
    /// Position of the entry in the coordinate list
    pub index: usize,
    /// The entry as written
    pub text: String,
    pub reason: CoordinateError,
}

/// Result of extracting one object's geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// The closed path, or `None` if no point could be read
    pub path: Option<Path>,
    /// Entries that were skipped, in input order
    pub skipped: Vec<SkippedCoordinate>,
}

/// Extract the closed outline of a map object.
///
/// Entries that fail to parse are logged, recorded in
/// [`Extraction::skipped`] and left out of the path.
///
/// # Examples
///
/// ```
/// # use mapsift::{extract::extract, identifier::{ObjectId, SymbolId}, object::MapObject};
/// let object = MapObject::new(ObjectId::new(0), SymbolId::new(1), "0 0;10 0 1;oops 3;10 10;");
/// let extraction = extract(&object);
///
/// let path = extraction.path.unwrap();
/// assert_eq!(path.len(), 3);
/// assert!(path.is_closed());
/// assert_eq!(extraction.skipped.len(), 1);
/// ```
pub fn extract(object: &MapObject) -> Extraction {
    let extraction = parse_coordinates(object.raw_coordinates());

    for skipped in &extraction.skipped {
        warn!(
            object = object.id().index(),
            entry = skipped.index,
            text = skipped.text.as_str(),
            reason = skipped.reason.to_string();
            "Skipping invalid coordinate"
        );
    }

    extraction
}

/// Parse coordinate text into a closed path.
pub fn parse_coordinates(text: &str) -> Extraction {
    let entries: Vec<(usize, Result<Point, CoordinateError>, String)> = if text.contains(';') {
        text.split(';')
            .enumerate()
            .filter(|(_, entry)| !entry.trim().is_empty())
            .map(|(index, entry)| {
                let mut tokens = entry.split_whitespace();
                let point = parse_point(tokens.next(), tokens.next());
                (index, point, entry.trim().to_string())
            })
            .collect()
    } else {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        tokens
            .chunks(2)
            .enumerate()
            .map(|(index, pair)| {
                let point = parse_point(pair.first().copied(), pair.get(1).copied());
                (index, point, pair.join(" "))
            })
            .collect()
    };

    let mut extraction = Extraction::default();
    let mut path = Path::new();

    for (index, point, entry) in entries {
        match point {
            Ok(point) if path.is_empty() => path.move_to(point),
            Ok(point) => path.line_to(point),
            Err(reason) => extraction.skipped.push(SkippedCoordinate {
                index,
                text: entry,
                reason,
            }),
        }
    }

    if !path.is_empty() {
        path.close();
        extraction.path = Some(path);
    }
    extraction
}

fn parse_point(x: Option<&str>, y: Option<&str>) -> Result<Point, CoordinateError> {
    // An entry always has at least one token once blanks are filtered out.
    let x = parse_number(x.unwrap_or_default())?;
    let y = parse_number(y.ok_or(CoordinateError::MissingY)?)?;
    Ok(Point::new(x, y))
}

fn parse_number(token: &str) -> Result<f64, CoordinateError> {
    let value: f64 = token
        .parse()
        .map_err(|_| CoordinateError::NotANumber(token.to_string()))?;
    if !value.is_finite() {
        return Err(CoordinateError::NotFinite(token.to_string()));
    }
    Ok(value)
}
