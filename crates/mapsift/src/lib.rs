//! mapsift - Object filtering and overlap resolution for orienteering maps.
//!
//! Reads OpenOrienteering Mapper map documents, removes objects by symbol
//! name and optionally resolves overlapping features by symbol priority,
//! then writes the document back with everything else left in place.
//!
//! The pipeline runs in stages, each available on its own:
//!
//! - [`extract`] - coordinate text to closed paths
//! - [`overlap`] - pairwise overlap detection with a pluggable broad phase
//! - [`visibility`] - which object of an overlapping pair is hidden
//! - [`filter`] - exclusion and hiding in a single ordered pass
//!
//! [`Sifter`] ties them together.

pub mod config;
pub mod extract;
pub mod filter;
pub mod overlap;
pub mod visibility;

mod error;

pub use mapsift_core::{catalog, geometry, identifier, object, symbol};

pub use error::MapSiftError;

use std::collections::HashMap;

use log::{debug, info};

use mapsift_parser::{MapDocument, ObjectEdit, error::Diagnostic};

use catalog::SymbolCatalog;
use config::AppConfig;
use filter::HideMode;
use identifier::ObjectId;
use object::MapObject;
use overlap::OverlapPair;
use visibility::HideSet;

/// What a [`Sifter::sift`] run should do.
///
/// # Examples
///
/// ```
/// # use mapsift::{SiftOptions, filter::HideMode};
/// let options = SiftOptions::new()
///     .exclude("Building")
///     .exclude("Road")
///     .with_overlap_resolution(true)
///     .with_hide_mode(HideMode::Transparent);
///
/// assert_eq!(options.excluded(), ["Building", "Road"]);
/// assert!(options.resolves_overlaps());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SiftOptions {
    exclude: Vec<String>,
    resolve_overlaps: bool,
    hide_mode: Option<HideMode>,
}

impl SiftOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a symbol name to remove; matched case-insensitively.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    /// Enables or disables overlap detection and hiding.
    pub fn with_overlap_resolution(mut self, resolve: bool) -> Self {
        self.resolve_overlaps = resolve;
        self
    }

    /// Overrides the configured hide mode.
    pub fn with_hide_mode(mut self, hide_mode: HideMode) -> Self {
        self.hide_mode = Some(hide_mode);
        self
    }

    pub fn excluded(&self) -> &[String] {
        &self.exclude
    }

    pub fn resolves_overlaps(&self) -> bool {
        self.resolve_overlaps
    }

    pub fn hide_mode(&self) -> Option<HideMode> {
        self.hide_mode
    }
}

/// Summary of a [`Sifter::sift`] run.
#[derive(Debug, Clone, Default)]
pub struct SiftReport {
    kept_count: usize,
    deleted_count: usize,
    hidden_count: usize,
    unparseable_count: usize,
    overlaps: Vec<OverlapPair>,
    hidden: HideSet,
    hide_mode: Option<HideMode>,
    unmatched_names: Vec<String>,
    warnings: Vec<Diagnostic>,
}

impl SiftReport {
    /// Objects written to the output
    pub fn kept_count(&self) -> usize {
        self.kept_count
    }

    /// Objects removed because their symbol was excluded
    pub fn deleted_count(&self) -> usize {
        self.deleted_count
    }

    /// Objects removed or made transparent by overlap resolution
    pub fn hidden_count(&self) -> usize {
        self.hidden_count
    }

    /// Objects dropped because their symbol reference was unusable
    pub fn unparseable_count(&self) -> usize {
        self.unparseable_count
    }

    /// Overlaps found; empty unless overlap resolution was enabled
    pub fn overlaps(&self) -> &[OverlapPair] {
        &self.overlaps
    }

    /// Objects selected for hiding
    pub fn hidden(&self) -> &HideSet {
        &self.hidden
    }

    /// Hide mode applied, if overlap resolution ran
    pub fn hide_mode(&self) -> Option<HideMode> {
        self.hide_mode
    }

    /// Excluded names that matched no symbol
    pub fn unmatched_names(&self) -> &[String] {
        &self.unmatched_names
    }

    /// Structure warnings of the document
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

/// Builder for filtering map documents.
///
/// # Examples
///
/// ```
/// use mapsift::{SiftOptions, Sifter, config::AppConfig};
///
/// let source = r#"<map>
///   <symbols count="2">
///     <symbol id="301" name="Building"/>
///     <symbol id="405" name="Forest"/>
///   </symbols>
///   <parts><part><objects count="2">
///     <object symbol="301"><coords>0 0;100 0;100 100;0 100</coords></object>
///     <object symbol="405"><coords>50 50;150 50;150 150;50 150</coords></object>
///   </objects></part></parts>
/// </map>"#;
///
/// let sifter = Sifter::new(AppConfig::default());
/// let mut document = sifter.parse(source).expect("Failed to parse");
///
/// let report = sifter.sift(&mut document, &SiftOptions::new().with_overlap_resolution(true));
/// assert_eq!(report.overlaps().len(), 1);
/// assert_eq!(report.hidden_count(), 1);
/// assert_eq!(report.kept_count(), 1);
///
/// let output = document.to_xml();
/// assert!(output.contains(r#"<objects count="1">"#));
/// ```
#[derive(Default)]
pub struct Sifter {
    config: AppConfig,
}

impl Sifter {
    /// Create a new sifter with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse map source text.
    ///
    /// # Errors
    ///
    /// Returns `MapSiftError::Parse` when the source is not well-formed XML.
    pub fn parse(&self, source: &str) -> Result<MapDocument, MapSiftError> {
        info!("Parsing map document");

        let document = MapDocument::parse(source)
            .map_err(|err| MapSiftError::new_parse_error(err, source))?;

        debug!(
            symbols = document.symbols().len(),
            objects = document.objects().len(),
            warnings = document.warnings().len();
            "Map document parsed successfully"
        );
        Ok(document)
    }

    /// Build the symbol catalog of a document.
    pub fn catalog(&self, document: &MapDocument) -> SymbolCatalog {
        SymbolCatalog::load(&document.symbols())
    }

    /// Filter a document in place.
    ///
    /// Objects of excluded symbols are removed. With overlap resolution
    /// enabled, overlapping objects of lower priority are then removed or
    /// made transparent according to the hide mode.
    pub fn sift(&self, document: &mut MapDocument, options: &SiftOptions) -> SiftReport {
        let catalog = self.catalog(document);
        let objects: Vec<MapObject> = document
            .objects()
            .iter()
            .enumerate()
            .map(|(index, record)| MapObject::from_record(ObjectId::new(index), record))
            .collect();
        info!(symbols = catalog.len(), objects = objects.len(); "Sifting map document");

        let exclusion = catalog.exclusion_set(options.excluded());

        let (overlaps, hidden, hide_mode) = if options.resolves_overlaps() {
            let overlaps = overlap::detect(&objects, &catalog, self.config.overlap());
            let hidden = visibility::resolve(
                &overlaps,
                &catalog,
                &self.config.visibility().exemptions(),
            );
            let hide_mode = options
                .hide_mode()
                .unwrap_or_else(|| self.config.visibility().hide_mode());
            (overlaps, hidden, Some(hide_mode))
        } else {
            (Vec::new(), HideSet::default(), None)
        };

        let outcome = filter::filter(
            &objects,
            &exclusion,
            hide_mode.map(|mode| (&hidden, mode)),
        );

        let edits: HashMap<ObjectId, Option<f64>> = outcome
            .kept()
            .iter()
            .map(|object| (object.id(), object.opacity()))
            .collect();
        document.rebuild(|id| match edits.get(&id) {
            Some(Some(opacity)) => ObjectEdit::SetOpacity(*opacity),
            Some(None) => ObjectEdit::Keep,
            None => ObjectEdit::Remove,
        });

        info!(
            deleted = outcome.deleted_count(),
            hidden = outcome.hidden_count(),
            overlaps = overlaps.len();
            "Sifting finished"
        );

        SiftReport {
            kept_count: outcome.kept().len(),
            deleted_count: outcome.deleted_count(),
            hidden_count: outcome.hidden_count(),
            unparseable_count: outcome.unparseable_count(),
            overlaps,
            hidden,
            hide_mode,
            unmatched_names: exclusion.unmatched().to_vec(),
            warnings: document.warnings().to_vec(),
        }
    }
}
