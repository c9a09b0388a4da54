use super::shared::{at, fill_legacy_common, legacy_laterality, strip_fixed_label, SourceParts};
use super::{ConventionParser, ParseOptions, Parsed};
use crate::convention::NamingConvention;
use crate::error::MetadataParseError;
use crate::record::{Field, RecordDraft};
use crate::tokenizer;
use chrono::NaiveDate;

/// Width of the `sec` label on the slide folder's section token
const SECTION_LABEL_WIDTH: usize = 3;

/// Parser for adenosine A2A images. Sample and laterality live in the
/// underscore-separated filename; section and magnification in the
/// underscore-separated slide folder above it:
///
/// `…/{stains}/…/{date}_{mag}_{run}_sec{n}/{date}_{tag}_{sample}_{lat}_{mag}_{channel}.tif`
pub struct A2aParser {
    options: ParseOptions,
}

impl A2aParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }
}

impl Default for A2aParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl ConventionParser for A2aParser {
    fn convention(&self) -> NamingConvention {
        NamingConvention::A2a
    }

    fn parse(&self, path: &str, modified: NaiveDate) -> Result<Parsed, MetadataParseError> {
        let parts = SourceParts::new(path)?;
        let mut draft = RecordDraft::new(parts.path, modified);
        let mut warnings = Vec::new();

        let name = tokenizer::underscore_tokens(parts.file_name);
        let sample_id = at(&name, 2, Field::SampleId, "filename")?;
        let side = at(&name, -3, Field::Laterality, "filename")?;

        let folder = tokenizer::underscore_tokens(parts.segment(-2, Field::Section)?);
        let section = strip_fixed_label(
            at(&folder, 3, Field::Section, "slide folder")?,
            SECTION_LABEL_WIDTH,
            Field::Section,
        )?;
        let magnification = at(&folder, 1, Field::Magnification, "slide folder")?;

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
