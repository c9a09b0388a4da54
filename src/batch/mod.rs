mod walker;


pub use walker::{ImageWalker, SourceImage, DEFAULT_EXTENSION};

use crate::canonical::CanonicalPath;
use crate::convention::{self, NamingConvention};
use crate::error::{AmbiguousEnumerationWarning, NormalizeError};
use crate::parser::{ParseOptions, ParserRegistry};
use crate::record::MetadataRecord;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// One source path carried all the way to its canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub convention: NamingConvention,
    pub record: MetadataRecord,
    pub canonical: CanonicalPath,
    pub warnings: Vec<AmbiguousEnumerationWarning>,
}

/// Classify -> parse -> build for single paths
pub struct Normalizer {
    registry: ParserRegistry,
}

impl Normalizer {
    pub fn new(options: ParseOptions) -> Self {
        Self::with_registry(ParserRegistry::with_builtin(options))
    }

    pub fn with_registry(registry: ParserRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Pure: the same path and date always give the same result
    pub fn normalize(
        &self,
        path: &str,
        modified: NaiveDate,
    ) -> Result<NormalizedImage, NormalizeError> {
        let convention = convention::classify(path);
        let parsed = self.registry.parse_as(path, convention, modified)?;
        let canonical = CanonicalPath::build(&parsed.record);
        Ok(NormalizedImage {
            convention,
            record: parsed.record,
            canonical,
            warnings: parsed.warnings,
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

/// A path that could not be normalized, kept for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub path: String,
    pub error: NormalizeError,
}

pub type BatchItem = Result<NormalizedImage, BatchFailure>;

/// Runs the normalizer over a stream of walked sources.
///
/// Failures are reported per item and never stop the batch. Nothing is
/// retained between items, so re-running over the same sources reproduces
/// the same sequence.
pub struct BatchCollector {
    normalizer: Normalizer,
}

impl BatchCollector {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Lazily normalize each source in order
    pub fn collect<'s, I>(&'s self, sources: I) -> impl Iterator<Item = BatchItem> + 's
    where
        I: IntoIterator<Item = SourceImage>,
        I::IntoIter: 's,
    {
        sources.into_iter().map(move |source| self.process(source))
    }

    /// Normalize across the rayon pool; results keep input order
    pub fn collect_parallel(&self, sources: Vec<SourceImage>) -> Vec<BatchItem> {
        sources
            .into_par_iter()
            .map(|source| self.process(source))
            .collect()
    }

    /// Lazily yield only the successes, logging each failure
    pub fn successes<'s, I>(&'s self, sources: I) -> impl Iterator<Item = NormalizedImage> + 's
    where
        I: IntoIterator<Item = SourceImage>,
        I::IntoIter: 's,
    {
        self.collect(sources).filter_map(Result::ok)
    }

    fn process(&self, source: SourceImage) -> BatchItem {
        match self.normalizer.normalize(&source.path, source.modified) {
            Ok(image) => {
                for warning in &image.warnings {
                    warn!(path = %source.path, "{}", warning);
                }
                debug!(
                    path = %source.path,
                    convention = %image.convention,
                    canonical = %image.canonical,
                    "normalized"
                );
                Ok(image)
            }
            Err(error) => {
                warn!(path = %source.path, "skipping: {}", error);
                Err(BatchFailure {
                    path: source.path,
                    error,
                })
            }
        }
    }
}

/// Running tally over batch items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub seen: usize,
    pub normalized: usize,
    pub unrecognized: usize,
    pub parse_failed: usize,
    pub warnings: usize,
}

impl BatchSummary {
    pub fn record(&mut self, item: &BatchItem) {
        self.seen += 1;
        match item {
            Ok(image) => {
                self.normalized += 1;
                self.warnings += image.warnings.len();
            }
            Err(BatchFailure {
                error: NormalizeError::Unrecognized(_),
                ..
            }) => self.unrecognized += 1,
            Err(BatchFailure {
                error: NormalizeError::Parse(_),
                ..
            }) => self.parse_failed += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.unrecognized + self.parse_failed
    }
}
