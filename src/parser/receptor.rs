use super::shared::{at, fill_legacy_common, legacy_laterality, SourceParts};
use super::{ConventionParser, ParseOptions, Parsed};
use crate::convention::NamingConvention;
use crate::error::MetadataParseError;
use crate::record::{Field, RecordDraft};
use crate::tokenizer;
use chrono::NaiveDate;

/// Where section and magnification sit among the slide folder's words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideLayout {
    /// Words 3 and 4 (`slide L sec 3 10x`)
    Indexed,
    /// The last two words, whatever precedes them
    Trailing,
}

/// Parser for the receptor-subtype conventions (5-HT2A, 5-HT2B, 5-HT7),
/// which encode metadata in the directory layout:
///
/// `…/{stains}/{any}/{sample}/{slide folder}/{file}`
///
/// The slide folder is whitespace-separated with laterality as word 1.
pub struct ReceptorParser {
    convention: NamingConvention,
    layout: SlideLayout,
    options: ParseOptions,
}

impl ReceptorParser {
    pub fn ht2a(options: ParseOptions) -> Self {
        Self {
            convention: NamingConvention::Ht2a,
            layout: SlideLayout::Indexed,
            options,
        }
    }

    pub fn ht2b(options: ParseOptions) -> Self {
        Self {
            convention: NamingConvention::Ht2b,
            layout: SlideLayout::Indexed,
            options,
        }
    }

    pub fn ht7(options: ParseOptions) -> Self {
        Self {
            convention: NamingConvention::Ht7,
            layout: SlideLayout::Trailing,
            options,
        }
    }

    pub fn layout(&self) -> SlideLayout {
        self.layout
    }
}

impl ConventionParser for ReceptorParser {
    fn convention(&self) -> NamingConvention {
        self.convention
    }

    fn parse(&self, path: &str, modified: NaiveDate) -> Result<Parsed, MetadataParseError> {
        let parts = SourceParts::new(path)?;
        let mut draft = RecordDraft::new(parts.path, modified);
        let mut warnings = Vec::new();

        let sample_id = parts.segment(-3, Field::SampleId)?;
        let slide = parts.segment(-2, Field::Laterality)?;
        let words = tokenizer::whitespace_tokens(slide);

        let side = at(&words, 1, Field::Laterality, "slide folder")?;
        let (section_at, magnification_at) = match self.layout {
            SlideLayout::Indexed => (3, 4),
            SlideLayout::Trailing => (-2, -1),
        };
        let section = at(&words, section_at, Field::Section, "slide folder")?;
        let magnification = at(&words, magnification_at, Field::Magnification, "slide folder")?;

        draft.sample_id = Some(sample_id.to_string());
        draft.laterality = Some(legacy_laterality(side, &mut warnings));
        draft.section = Some(section.to_string());
        draft.magnification = Some(magnification.to_string());
        fill_legacy_common(&mut draft, &parts, &self.options, &mut warnings)?;

        Ok(Parsed {
            record: draft.finish()?,
            warnings,
        })
    }
}
