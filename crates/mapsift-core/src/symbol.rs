//! Symbol definitions and the visibility priority heuristic.
//!
//! A [`Symbol`] is a named feature type ("Building", "Road", "Open land",
//! ...) that map objects reference by id. Each symbol carries a priority in
//! `0..=100` derived from its name and the kinds of geometry it draws. When
//! two objects overlap, the one whose symbol has the higher priority stays
//! visible.

use crate::identifier::SymbolId;

/// Priority assigned to a symbol whose name matches no keyword group.
pub const BASE_PRIORITY: u8 = 50;

/// Bonus for symbols that declare point geometry.
pub const POINT_BONUS: i32 = 5;

/// Bonus for symbols that declare line geometry.
pub const LINE_BONUS: i32 = 3;

/// Keyword groups, tested in order against the lowercased symbol name.
///
/// The first group with a keyword contained in the name decides the base
/// priority.
const KEYWORD_PRIORITIES: &[(&[&str], i32)] = &[
    (&["building", "tower"], 90),
    (&["path", "road", "track", "area"], 85),
    (&["water", "lake", "pond"], 80),
    (&["contour", "slope"], 70),
    (&["index"], 75),
    (&["forest", "vegetation", "vineyard"], 30),
    (&["open", "field"], 20),
];

/// The kinds of geometry a symbol definition declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GeometryFlags {
    point: bool,
    line: bool,
}

impl GeometryFlags {
    /// Creates flags from the two geometry markers
    pub fn new(point: bool, line: bool) -> Self {
        Self { point, line }
    }

    /// Returns true if the symbol declares point geometry
    pub fn has_point(self) -> bool {
        self.point
    }

    /// Returns true if the symbol declares line geometry
    pub fn has_line(self) -> bool {
        self.line
    }
}

/// A symbol definition as it appears in a document, before validation.
///
/// Numeric fields are kept as text; [`SymbolCatalog`](crate::catalog::SymbolCatalog)
/// decides which records are usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolRecord {
    /// Raw `id` attribute, if present
    pub id: Option<String>,
    /// Raw `name` attribute; empty when absent
    pub name: String,
    /// Geometry kinds declared by the definition
    pub geometry: GeometryFlags,
}

impl SymbolRecord {
    /// Creates a record with the given raw id and name and no geometry flags.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            geometry: GeometryFlags::default(),
        }
    }

    /// Sets the geometry flags
    pub fn with_geometry(mut self, geometry: GeometryFlags) -> Self {
        self.geometry = geometry;
        self
    }
}

/// A validated symbol definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    id: SymbolId,
    name: String,
    priority: u8,
    geometry: GeometryFlags,
}

impl Symbol {
    /// Creates a symbol and derives its priority from the name and geometry.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mapsift_core::{identifier::SymbolId, symbol::{GeometryFlags, Symbol}};
    /// let building = Symbol::new(SymbolId::new(5), "Building", GeometryFlags::default());
    /// assert_eq!(building.priority(), 90);
    ///
    /// let boulder = Symbol::new(SymbolId::new(2), "Boulder", GeometryFlags::new(true, false));
    /// assert_eq!(boulder.priority(), 55);
    /// ```
    pub fn new(id: SymbolId, name: impl Into<String>, geometry: GeometryFlags) -> Self {
        let name = name.into();
        let priority = calculate_priority(&name, geometry);
        Self {
            id,
            name,
            priority,
            geometry,
        }
    }

    /// Returns the symbol id
    pub fn id(&self) -> SymbolId {
        self.id
    }

    /// Returns the symbol name as written in the document
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the visibility priority
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Returns the declared geometry kinds
    pub fn geometry(&self) -> GeometryFlags {
        self.geometry
    }
}

/// Computes the visibility priority of a symbol.
///
/// Starts at [`BASE_PRIORITY`], lets the first matching keyword group
/// override it, adds the geometry bonuses and clamps to `0..=100`.
///
/// # Examples
///
/// ```
/// # use mapsift_core::symbol::{GeometryFlags, calculate_priority};
/// assert_eq!(calculate_priority("Paved area", GeometryFlags::default()), 85);
/// assert_eq!(calculate_priority("Lake", GeometryFlags::new(false, true)), 83);
/// assert_eq!(calculate_priority("Building", GeometryFlags::new(true, true)), 98);
/// assert_eq!(calculate_priority("Boulder", GeometryFlags::default()), 50);
/// ```
pub fn calculate_priority(name: &str, geometry: GeometryFlags) -> u8 {
    let name = name.to_lowercase();

    let mut priority = KEYWORD_PRIORITIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map_or(i32::from(BASE_PRIORITY), |(_, priority)| *priority);

    if geometry.has_point() {
        priority += POINT_BONUS;
    }
    if geometry.has_line() {
        priority += LINE_BONUS;
    }

    // Clamped to 0..=100 above, so the cast is lossless.
    priority.clamp(0, 100) as u8
}
