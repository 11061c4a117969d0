//! Object filtering by symbol exclusion and hide set.

use std::{fmt, str::FromStr};

use log::{debug, info};
use serde::Deserialize;

use mapsift_core::{catalog::ExclusionSet, object::MapObject};

use crate::visibility::HideSet;

/// Opacity written on objects hidden in [`HideMode::Transparent`].
pub const TRANSPARENT_OPACITY: f64 = 0.5;

/// What happens to an object selected for hiding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HideMode {
    /// Drop the object from the output
    #[default]
    Remove,
    /// Keep the object at [`TRANSPARENT_OPACITY`]
    Transparent,
}

impl fmt::Display for HideMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HideMode::Remove => write!(f, "remove"),
            HideMode::Transparent => write!(f, "transparent"),
        }
    }
}

impl FromStr for HideMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "remove" => Ok(HideMode::Remove),
            "transparent" => Ok(HideMode::Transparent),
            other => Err(format!(
                "unknown hide mode `{other}`, expected `remove` or `transparent`"
            )),
        }
    }
}

/// Result of a filter pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    kept: Vec<MapObject>,
    deleted_count: usize,
    hidden_count: usize,
    unparseable_count: usize,
}

impl FilterOutcome {
    /// Objects that remain, in input order
    pub fn kept(&self) -> &[MapObject] {
        &self.kept
    }

    /// Consumes the outcome and returns the kept objects
    pub fn into_kept(self) -> Vec<MapObject> {
        self.kept
    }

    /// Objects dropped because their symbol was excluded
    pub fn deleted_count(&self) -> usize {
        self.deleted_count
    }

    /// Objects removed or made transparent by the hide set
    pub fn hidden_count(&self) -> usize {
        self.hidden_count
    }

    /// Objects dropped because their symbol reference was absent or not numeric
    pub fn unparseable_count(&self) -> usize {
        self.unparseable_count
    }
}

/// Filter objects in a single ordered pass.
///
/// For each object, in order:
///
/// 1. no usable symbol reference: dropped, counted as unparseable;
/// 2. symbol in `exclusion`: dropped, counted as deleted;
/// 3. object in the hide set: removed or made transparent per the
///    [`HideMode`], counted as hidden;
/// 4. otherwise kept unchanged.
///
/// # Examples
///
/// ```
/// # use mapsift::{
/// #     catalog::ExclusionSet, filter::filter, identifier::{ObjectId, SymbolId},
/// #     object::MapObject,
/// # };
/// let objects = [
///     MapObject::new(ObjectId::new(0), SymbolId::new(5), ""),
///     MapObject::new(ObjectId::new(1), SymbolId::new(7), ""),
///     MapObject::unresolved(ObjectId::new(2), ""),
/// ];
/// let exclusion: ExclusionSet = [SymbolId::new(5)].into_iter().collect();
///
/// let outcome = filter(&objects, &exclusion, None);
/// assert_eq!(outcome.kept().len(), 1);
/// assert_eq!(outcome.deleted_count(), 1);
/// assert_eq!(outcome.unparseable_count(), 1);
/// ```
pub fn filter(
    objects: &[MapObject],
    exclusion: &ExclusionSet,
    hide: Option<(&HideSet, HideMode)>,
) -> FilterOutcome {
    info!(objects = objects.len(), excluded_symbols = exclusion.len(); "Filtering objects");

    let mut outcome = FilterOutcome::default();
    for object in objects {
        let Some(symbol_id) = object.symbol_id() else {
            outcome.unparseable_count += 1;
            continue;
        };

        if exclusion.contains(symbol_id) {
            outcome.deleted_count += 1;
            continue;
        }

        match hide {
            Some((hidden, mode)) if hidden.contains(object.id()) => {
                outcome.hidden_count += 1;
                if mode == HideMode::Transparent {
                    outcome
                        .kept
                        .push(object.clone().with_opacity(TRANSPARENT_OPACITY));
                }
            }
            _ => outcome.kept.push(object.clone()),
        }
    }

    debug!(
        kept = outcome.kept.len(),
        deleted = outcome.deleted_count,
        hidden = outcome.hidden_count,
        unparseable = outcome.unparseable_count;
        "Filtering finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use mapsift_core::{
        catalog::SymbolCatalog,
        identifier::{ObjectId, SymbolId},
        symbol::SymbolRecord,
    };

    use super::*;

    fn objects() -> Vec<MapObject> {
        vec![
            MapObject::new(ObjectId::new(0), SymbolId::new(5), "0 0"),
            MapObject::new(ObjectId::new(1), SymbolId::new(9), "1 1"),
            MapObject::new(ObjectId::new(2), SymbolId::new(5), "2 2"),
            MapObject::new(ObjectId::new(3), SymbolId::new(12), "3 3"),
            MapObject::new(ObjectId::new(4), SymbolId::new(77), "4 4"),
        ]
    }

    fn catalog() -> SymbolCatalog {
        SymbolCatalog::load(&[
            SymbolRecord::new("5", "Building"),
            SymbolRecord::new("9", "Open land"),
            SymbolRecord::new("12", "Road"),
        ])
    }

    fn kept_ids(outcome: &FilterOutcome) -> Vec<usize> {
        outcome.kept().iter().map(|o| o.id().index()).collect()
    }

    #[test]
    fn test_empty_exclusion_is_identity() {
        let objects = objects();
        let outcome = filter(&objects, &ExclusionSet::default(), None);

        assert_eq!(outcome.kept(), objects.as_slice());
        assert_eq!(outcome.deleted_count(), 0);
        assert_eq!(outcome.hidden_count(), 0);
        assert_eq!(outcome.unparseable_count(), 0);
    }

    #[test]
    fn test_exclusion_by_name_any_case() {
        for name in ["building", "BUILDING", "Building"] {
            let exclusion = catalog().exclusion_set([name]);
            let outcome = filter(&objects(), &exclusion, None);

            assert_eq!(kept_ids(&outcome), [1, 3, 4]);
            assert_eq!(outcome.deleted_count(), 2);
        }
    }

    #[test]
    fn test_unparseable_dropped_silently() {
        let mut objects = objects();
        objects.insert(1, MapObject::unresolved(ObjectId::new(9), "9 9"));

        let outcome = filter(&objects, &ExclusionSet::default(), None);
        assert_eq!(outcome.kept().len(), 5);
        assert_eq!(outcome.deleted_count(), 0);
        assert_eq!(outcome.unparseable_count(), 1);
    }

    #[test]
    fn test_unknown_symbol_is_kept() {
        let outcome = filter(&objects(), &ExclusionSet::default(), None);
        assert!(kept_ids(&outcome).contains(&4));
    }

    #[test]
    fn test_hide_remove() {
        let hide: HideSet = [ObjectId::new(1), ObjectId::new(3)].into_iter().collect();
        let outcome = filter(&objects(), &ExclusionSet::default(), Some((&hide, HideMode::Remove)));

        assert_eq!(kept_ids(&outcome), [0, 2, 4]);
        assert_eq!(outcome.hidden_count(), 2);
        assert!(outcome.kept().iter().all(|o| o.opacity().is_none()));
    }

    #[test]
    fn test_hide_transparent() {
        let hide: HideSet = [ObjectId::new(3)].into_iter().collect();
        let outcome = filter(
            &objects(),
            &ExclusionSet::default(),
            Some((&hide, HideMode::Transparent)),
        );

        assert_eq!(kept_ids(&outcome), [0, 1, 2, 3, 4]);
        assert_eq!(outcome.hidden_count(), 1);
        assert_eq!(outcome.kept()[3].opacity(), Some(TRANSPARENT_OPACITY));
        assert_eq!(outcome.kept()[0].opacity(), None);
    }

    #[test]
    fn test_exclusion_wins_over_hiding() {
        let exclusion = catalog().exclusion_set(["Building"]);
        let hide: HideSet = [ObjectId::new(0)].into_iter().collect();
        let outcome = filter(&objects(), &exclusion, Some((&hide, HideMode::Remove)));

        assert_eq!(outcome.deleted_count(), 2);
        assert_eq!(outcome.hidden_count(), 0);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let exclusion = catalog().exclusion_set(["Building", "road"]);
        let first = filter(&objects(), &exclusion, None);
        let second = filter(first.kept(), &exclusion, None);

        assert_eq!(second.deleted_count(), 0);
        assert_eq!(second.kept(), first.kept());
    }

    #[test]
    fn test_hide_mode_parse_and_display() {
        assert_eq!("remove".parse::<HideMode>(), Ok(HideMode::Remove));
        assert_eq!("Transparent".parse::<HideMode>(), Ok(HideMode::Transparent));
        assert!("fade".parse::<HideMode>().is_err());
        assert_eq!(HideMode::Transparent.to_string(), "transparent");
    }
}
