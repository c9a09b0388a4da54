// Public API exports
pub mod batch;
pub mod canonical;
pub mod config;
pub mod convention;
pub mod error;
pub mod parser;
pub mod record;
pub mod sinks;
pub mod tokenizer;
pub mod warehouse;

// Re-export main types for convenience
pub use error::{AmbiguousEnumerationWarning, MetadataParseError, NormalizeError, UnrecognizedFormatError};

pub use convention::{classify, NamingConvention};

pub use record::{Channel, Field, Laterality, MetadataRecord, MetadataRow};

pub use parser::{
    A2aParser, ConventionParser, HtParser, ParseOptions, Parsed, ParserRegistry, ReceptorParser,
    SparcParser, DEFAULT_SPECIMEN,
};

pub use canonical::{CanonicalPath, SAMPLES_ROOT};

pub use batch::{
    BatchCollector, BatchFailure, BatchItem, BatchSummary, ImageWalker, NormalizedImage,
    Normalizer, SourceImage,
};

pub use sinks::{
    deliver, relocate, rename_in_place, MetadataLog, MoveOutcome, Placement, TagWriter,
    XmpSidecarWriter,
};

pub use warehouse::{SqliteWarehouse, UploadOutcome, Uploader, Warehouse};

pub use config::Config;
