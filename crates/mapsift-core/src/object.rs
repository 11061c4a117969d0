//! Map objects: the feature instances placed on a map.

use log::warn;

use crate::identifier::{ObjectId, SymbolId};

/// A map object as it appears in a document, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRecord {
    /// Raw `symbol` attribute, if present
    pub symbol: Option<String>,
    /// Raw coordinate text; empty when the object has no coordinates
    pub coordinates: String,
}

impl ObjectRecord {
    /// Creates a record referencing `symbol` with the given coordinate text.
    pub fn new(symbol: impl Into<String>, coordinates: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            coordinates: coordinates.into(),
        }
    }
}

/// A single feature instance referencing one symbol.
///
/// The symbol reference is optional: documents may contain objects whose
/// `symbol` attribute is missing or not a number. Such objects never take
/// part in overlap analysis and are dropped silently by the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    id: ObjectId,
    symbol_id: Option<SymbolId>,
    raw_coordinates: String,
    opacity: Option<f64>,
}

impl MapObject {
    /// Creates an object with a resolved symbol reference.
    pub fn new(id: ObjectId, symbol_id: SymbolId, raw_coordinates: impl Into<String>) -> Self {
        Self {
            id,
            symbol_id: Some(symbol_id),
            raw_coordinates: raw_coordinates.into(),
            opacity: None,
        }
    }

    /// Creates an object whose symbol reference could not be parsed.
    pub fn unresolved(id: ObjectId, raw_coordinates: impl Into<String>) -> Self {
        Self {
            id,
            symbol_id: None,
            raw_coordinates: raw_coordinates.into(),
            opacity: None,
        }
    }

    /// Builds an object from a document record, logging unusable symbol references.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mapsift_core::{identifier::{ObjectId, SymbolId}, object::{MapObject, ObjectRecord}};
    /// let record = ObjectRecord::new("12", "0 0;10 0;10 10");
    /// let object = MapObject::from_record(ObjectId::new(0), &record);
    /// assert_eq!(object.symbol_id(), Some(SymbolId::new(12)));
    ///
    /// let broken = ObjectRecord::new("twelve", "");
    /// assert_eq!(MapObject::from_record(ObjectId::new(1), &broken).symbol_id(), None);
    /// ```
    pub fn from_record(id: ObjectId, record: &ObjectRecord) -> Self {
        match SymbolId::parse_attr(record.symbol.as_deref()) {
            Ok(symbol_id) => Self::new(id, symbol_id, record.coordinates.clone()),
            Err(err) => {
                warn!(object = id.index(), error = err.to_string(); "Object has no usable symbol reference");
                Self::unresolved(id, record.coordinates.clone())
            }
        }
    }

    /// Returns the object id
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the referenced symbol, if the reference was parseable
    pub fn symbol_id(&self) -> Option<SymbolId> {
        self.symbol_id
    }

    /// Returns the raw coordinate text
    pub fn raw_coordinates(&self) -> &str {
        &self.raw_coordinates
    }

    /// Returns the opacity annotation, if one was set
    pub fn opacity(&self) -> Option<f64> {
        self.opacity
    }

    /// Sets the opacity annotation
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_record_valid() {
        let record = ObjectRecord::new(" 301 ", "1 2;3 4");
        let object = MapObject::from_record(ObjectId::new(4), &record);

        assert_eq!(object.id(), ObjectId::new(4));
        assert_eq!(object.symbol_id(), Some(SymbolId::new(301)));
        assert_eq!(object.raw_coordinates(), "1 2;3 4");
        assert_eq!(object.opacity(), None);
    }

    #[test]
    fn test_from_record_missing_symbol() {
        let record = ObjectRecord {
            symbol: None,
            coordinates: "1 2".to_string(),
        };
        let object = MapObject::from_record(ObjectId::new(0), &record);

        assert_eq!(object.symbol_id(), None);
        assert_eq!(object.raw_coordinates(), "1 2");
    }

    #[test]
    fn test_from_record_non_numeric_symbol() {
        let record = ObjectRecord::new("", "");
        assert_eq!(MapObject::from_record(ObjectId::new(0), &record).symbol_id(), None);

        let record = ObjectRecord::new("4.5", "");
        assert_eq!(MapObject::from_record(ObjectId::new(0), &record).symbol_id(), None);
    }

    #[test]
    fn test_with_opacity() {
        let object = MapObject::new(ObjectId::new(1), SymbolId::new(2), "").with_opacity(0.5);
        assert_eq!(object.opacity(), Some(0.5));
    }
}
