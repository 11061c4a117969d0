//! The symbol catalog: id and name lookups over a document's symbol set.
//!
//! [`SymbolCatalog`] is built once from the raw symbol records of a document
//! and is read-only afterwards. It answers two questions for the rest of the
//! pipeline:
//!
//! - which priority does a symbol id have ([`SymbolCatalog::priority_of`]), and
//! - which id does a user-supplied symbol name refer to ([`SymbolCatalog::id_of`]).

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::{
    identifier::SymbolId,
    symbol::{Symbol, SymbolRecord},
};

/// Read-only lookup tables over the symbols of one document.
///
/// # Examples
///
/// ```
/// # use mapsift_core::{catalog::SymbolCatalog, identifier::SymbolId, symbol::SymbolRecord};
/// let catalog = SymbolCatalog::load(&[
///     SymbolRecord::new("5", "Building"),
///     SymbolRecord::new("9", "Open land"),
///     SymbolRecord::new("x", "Broken"),
/// ]);
///
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.id_of("BUILDING"), Some(SymbolId::new(5)));
/// assert_eq!(catalog.priority_of(SymbolId::new(9)), 20);
/// assert_eq!(catalog.priority_of(SymbolId::new(1234)), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SymbolCatalog {
    /// Symbols in document order
    symbols: Vec<Symbol>,
    /// Index into `symbols` by id
    by_id: HashMap<SymbolId, usize>,
    /// Lowercased name to id
    by_name: HashMap<String, SymbolId>,
}

impl SymbolCatalog {
    /// Builds a catalog from raw symbol records.
    ///
    /// Records with a missing or non-numeric id are skipped with a warning.
    /// If an id occurs twice, the later definition replaces the earlier one.
    /// If a name occurs twice (ignoring case), the later symbol wins the name.
    pub fn load<'a>(records: impl IntoIterator<Item = &'a SymbolRecord>) -> Self {
        let mut catalog = Self::default();

        for record in records {
            let id = match SymbolId::parse_attr(record.id.as_deref()) {
                Ok(id) => id,
                Err(err) => {
                    warn!(name = record.name.as_str(), error = err.to_string(); "Skipping symbol without a usable id");
                    continue;
                }
            };

            catalog.insert(Symbol::new(id, record.name.clone(), record.geometry));
        }

        debug!(symbols = catalog.len(); "Symbol catalog loaded");
        catalog
    }

    /// Adds a symbol, replacing any symbol with the same id.
    fn insert(&mut self, symbol: Symbol) {
        let name = symbol.name().to_lowercase();
        let id = symbol.id();

        match self.by_id.get(&id) {
            Some(&index) => {
                warn!(symbol = id.value(); "Duplicate symbol id, later definition wins");
                self.symbols[index] = symbol;
            }
            None => {
                self.by_id.insert(id, self.symbols.len());
                self.symbols.push(symbol);
            }
        }

        if !name.is_empty() {
            self.by_name.insert(name, id);
        }
    }

    /// Returns the priority of a symbol, or `0` for unknown ids.
    pub fn priority_of(&self, id: SymbolId) -> u8 {
        self.get(id).map_or(0, Symbol::priority)
    }

    /// Looks up a symbol id by name, ignoring case.
    pub fn id_of(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    /// Returns the symbol with the given id
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.by_id.get(&id).map(|&index| &self.symbols[index])
    }

    /// Returns true if the catalog defines `id`
    pub fn contains(&self, id: SymbolId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Returns the number of symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the catalog holds no symbols
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates over the symbols in document order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Iterates over `(id, priority)` for every symbol, in document order.
    pub fn priorities(&self) -> impl Iterator<Item = (SymbolId, u8)> + '_ {
        self.symbols.iter().map(|symbol| (symbol.id(), symbol.priority()))
    }

    /// Resolves user-supplied symbol names into a set of symbol ids.
    ///
    /// Names that match no symbol are reported in [`ExclusionSet::unmatched`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use mapsift_core::{catalog::SymbolCatalog, identifier::SymbolId, symbol::SymbolRecord};
    /// let catalog = SymbolCatalog::load(&[SymbolRecord::new("5", "Building")]);
    /// let exclusion = catalog.exclusion_set(["building", "Helipad"]);
    ///
    /// assert!(exclusion.contains(SymbolId::new(5)));
    /// assert_eq!(exclusion.unmatched(), ["Helipad"]);
    /// ```
    pub fn exclusion_set<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> ExclusionSet {
        let mut exclusion = ExclusionSet::default();

        for name in names {
            let name = name.as_ref();
            match self.id_of(name) {
                Some(id) => {
                    exclusion.ids.insert(id);
                }
                None => {
                    warn!(name; "No symbol matches name");
                    exclusion.unmatched.push(name.to_string());
                }
            }
        }

        exclusion
    }
}

/// Symbol ids selected for removal by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    ids: HashSet<SymbolId>,
    unmatched: Vec<String>,
}

impl ExclusionSet {
    /// Returns true if objects of `id` are to be removed
    pub fn contains(&self, id: SymbolId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns the number of excluded symbols
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing is excluded
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the names that matched no symbol, in input order
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }
}

impl FromIterator<SymbolId> for ExclusionSet {
    fn from_iter<T: IntoIterator<Item = SymbolId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
            unmatched: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::GeometryFlags;

    fn catalog() -> SymbolCatalog {
        SymbolCatalog::load(&[
            SymbolRecord::new("5", "Building"),
            SymbolRecord::new("9", "Open land"),
            SymbolRecord::new("12", "Boulder").with_geometry(GeometryFlags::new(true, false)),
        ])
    }

    #[test]
    fn test_load_and_lookup() {
        let catalog = catalog();

        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.priority_of(SymbolId::new(5)), 90);
        assert_eq!(catalog.priority_of(SymbolId::new(9)), 20);
        assert_eq!(catalog.priority_of(SymbolId::new(12)), 55);
        assert_eq!(catalog.get(SymbolId::new(12)).map(Symbol::name), Some("Boulder"));
    }

    #[test]
    fn test_unknown_id_defaults_to_zero() {
        let catalog = catalog();
        assert_eq!(catalog.priority_of(SymbolId::new(77)), 0);
        assert!(!catalog.contains(SymbolId::new(77)));
    }

    #[test]
    fn test_skips_invalid_ids() {
        let mut missing = SymbolRecord::new("", "Missing");
        missing.id = None;

        let catalog = SymbolCatalog::load(&[
            missing,
            SymbolRecord::new("", "Empty"),
            SymbolRecord::new("abc", "Letters"),
            SymbolRecord::new("3", "Road"),
        ]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.id_of("letters"), None);
        assert_eq!(catalog.id_of("road"), Some(SymbolId::new(3)));
    }

    #[test]
    fn test_name_lookup_case_insensitive() {
        let catalog = catalog();
        assert_eq!(catalog.id_of("building"), Some(SymbolId::new(5)));
        assert_eq!(catalog.id_of("BUILDING"), Some(SymbolId::new(5)));
        assert_eq!(catalog.id_of("oPEN LAND"), Some(SymbolId::new(9)));
        assert_eq!(catalog.id_of("open"), None);
    }

    #[test]
    fn test_duplicate_ids_later_wins() {
        let catalog = SymbolCatalog::load(&[
            SymbolRecord::new("1", "Forest"),
            SymbolRecord::new("2", "Road"),
            SymbolRecord::new("1", "Building"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.priority_of(SymbolId::new(1)), 90);
        let ids: Vec<_> = catalog.iter().map(Symbol::id).collect();
        assert_eq!(ids, [SymbolId::new(1), SymbolId::new(2)]);
    }

    #[test]
    fn test_duplicate_names_later_wins() {
        let catalog = SymbolCatalog::load(&[
            SymbolRecord::new("1", "Fence"),
            SymbolRecord::new("2", "fence"),
        ]);
        assert_eq!(catalog.id_of("Fence"), Some(SymbolId::new(2)));
    }

    #[test]
    fn test_priorities_in_document_order() {
        let priorities: Vec<_> = catalog().priorities().collect();
        assert_eq!(
            priorities,
            [
                (SymbolId::new(5), 90),
                (SymbolId::new(9), 20),
                (SymbolId::new(12), 55)
            ]
        );
    }

    #[test]
    fn test_exclusion_set() {
        let exclusion = catalog().exclusion_set(["Building", "open LAND", "Cliff"]);

        assert_eq!(exclusion.len(), 2);
        assert!(exclusion.contains(SymbolId::new(5)));
        assert!(exclusion.contains(SymbolId::new(9)));
        assert!(!exclusion.contains(SymbolId::new(12)));
        assert_eq!(exclusion.unmatched(), ["Cliff"]);
    }

    #[test]
    fn test_exclusion_set_empty() {
        let exclusion = catalog().exclusion_set(Vec::<String>::new());
        assert!(exclusion.is_empty());
        assert!(exclusion.unmatched().is_empty());
    }
}
