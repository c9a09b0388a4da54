mod a2a;
mod ht;
mod receptor;
mod registry;
mod shared;
mod sparc;

#[cfg(test)]
mod tests;

pub use a2a::A2aParser;
pub use ht::HtParser;
pub use receptor::{ReceptorParser, SlideLayout};
pub use registry::ParserRegistry;
pub use sparc::SparcParser;

use crate::convention::NamingConvention;
use crate::error::{AmbiguousEnumerationWarning, MetadataParseError};
use crate::record::MetadataRecord;
use chrono::NaiveDate;

/// Specimen assigned to conventions whose names never record one
pub const DEFAULT_SPECIMEN: &str = "phrenic";

/// Core trait that every naming-convention strategy implements
pub trait ConventionParser: Send + Sync {
    /// The convention this strategy understands
    fn convention(&self) -> NamingConvention;

    /// Extract a complete record from `path`, or report the first field that
    /// could not be located
    ///
    /// # Arguments
    /// * `path` - Forward-slash source path (e.g. "data/5ht7/M1/slide L 3 10x/img_ch1.tif")
    /// * `modified` - File modification date, supplied by the caller
    fn parse(&self, path: &str, modified: NaiveDate) -> Result<Parsed, MetadataParseError>;
}

/// A successfully parsed record plus any enumeration fallbacks taken on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub record: MetadataRecord,
    pub warnings: Vec<AmbiguousEnumerationWarning>,
}

/// Options shared by the built-in strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Specimen for conventions that do not encode one
    pub default_specimen: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_specimen: DEFAULT_SPECIMEN.to_string(),
        }
    }
}
