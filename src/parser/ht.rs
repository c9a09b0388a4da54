use super::shared::{
    at, fill_legacy_common, has_label, is_whole_mount, legacy_laterality, strip_fixed_label,
    SourceParts, SECTION_LABEL,
};
use super::{ConventionParser, ParseOptions, Parsed};
use crate::convention::NamingConvention;
use crate::error::MetadataParseError;
use crate::record::{Field, Laterality, RecordDraft};
use crate::tokenizer::{self, Tokens};
use chrono::NaiveDate;

/// Parser for serotonin (5-HT) images, where everything but the stain is
/// packed positionally into the filename:
///
/// `{label}_{sample}_section{n}_{lat}_{mag}_{channel}.tif`, or with the
/// section label in second place, `{label} {sample}_section{n}_…`.
/// The label is the whole first `_` token and may span several words.
/// 2x overviews put the section where the laterality would be.
pub struct HtParser {
    options: ParseOptions,
}

impl HtParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }
}

impl Default for HtParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl ConventionParser for HtParser {
    fn convention(&self) -> NamingConvention {
        NamingConvention::Ht
    }

    fn parse(&self, path: &str, modified: NaiveDate) -> Result<Parsed, MetadataParseError> {
        let parts = SourceParts::new(path)?;
        let tokens = tokenizer::sub_tokens(parts.file_name);
        let mut draft = RecordDraft::new(parts.path, modified);
        let mut warnings = Vec::new();

        let magnification = at(&tokens, -3, Field::Magnification, "filename")?;
        let whole_mount = is_whole_mount(magnification);

        let fields = tokenizer::underscore_tokens(tokenizer::stem(parts.file_name));
        let label = at(&fields, 0, Field::SampleId, "filename")?;
        let second = at(&fields, 1, Field::SampleId, "filename")?;
        let labelled_second = has_label(second, SECTION_LABEL);
        let sample_id = if labelled_second {
            labelled_sample(label, &fields)?
        } else {
            second
        };

        let side = at(&tokens, -4, Field::Laterality, "filename")?;
        let laterality = match Laterality::from_legacy(side) {
            Some(known) => known,
            None if whole_mount => Laterality::Whole,
            None => legacy_laterality(side, &mut warnings),
        };

        let section = if whole_mount {
            strip_fixed_label(side, SECTION_LABEL.len(), Field::Section)?
        } else if labelled_second {
            strip_fixed_label(second, SECTION_LABEL.len(), Field::Section)?
        } else {
            let token = at(&tokens, -5, Field::Section, "filename")?;
            if has_label(token, SECTION_LABEL) {
                &token[SECTION_LABEL.len()..]
            } else {
                token
            }
        };

        draft.sample_id = Some(sample_id.to_string());
        draft.laterality = Some(laterality);
        draft.section = Some(section.to_string());
        draft.magnification = Some(magnification.to_string());
        fill_legacy_common(&mut draft, &parts, &self.options, &mut warnings)?;

        Ok(Parsed {
            record: draft.finish()?,
            warnings,
        })
    }
}

/// Sample id when the second `_` token is the section label
fn labelled_sample<'a>(
    label: &'a str,
    fields: &Tokens<'a>,
) -> Result<&'a str, MetadataParseError> {
    let words = tokenizer::whitespace_tokens(label);
    if words.len() > 1 {
        return at(&words, -1, Field::SampleId, "acquisition label");
    }
    at(fields, 2, Field::SampleId, "filename")
}
