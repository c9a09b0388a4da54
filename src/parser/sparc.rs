use super::shared::{detect_z_stack_token, SourceParts};
use super::{ConventionParser, Parsed};
use crate::convention::NamingConvention;
use crate::error::MetadataParseError;
use crate::record::{Channel, Field, Laterality, RecordDraft};
use crate::tokenizer;
use chrono::NaiveDate;

/// Parser for names already in SPARC-BIDS form:
/// `sam-{id}_spec-{s}_lat-{l}_stain-{st}_sec-{se}_mag-{m}[_z-{z}|_z{n}][_ch{n}]{ext}`
pub struct SparcParser;

/// Tags pulled out of a SPARC filename, before validation
#[derive(Debug, Default)]
struct SparcTags<'a> {
    sample: Option<&'a str>,
    specimen: Option<&'a str>,
    laterality: Option<&'a str>,
    stain: Option<&'a str>,
    section: Option<&'a str>,
    magnification: Option<&'a str>,
    z_stack: Option<&'a str>,
    /// Underscore tokens that are not `key-value` pairs (`z01`, `ch2`)
    bare: Vec<&'a str>,
}

impl<'a> SparcTags<'a> {
    fn read(stem: &'a str) -> Self {
        let mut tags = SparcTags::default();
        for token in tokenizer::underscore_tokens(stem).iter() {
            let Some((key, value)) = token.split_once('-') else {
                tags.bare.push(token);
                continue;
            };
            let slot = match key.to_ascii_lowercase().as_str() {
                "sam" => &mut tags.sample,
                "spec" => &mut tags.specimen,
                "lat" => &mut tags.laterality,
                "stain" => &mut tags.stain,
                "sec" => &mut tags.section,
                "mag" => &mut tags.magnification,
                "z" => &mut tags.z_stack,
                _ => continue,
            };
            // First occurrence wins
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        tags
    }
}

fn tag<'a>(slot: Option<&'a str>, field: Field, key: &str) -> Result<&'a str, MetadataParseError> {
    slot.ok_or_else(|| MetadataParseError::new(field, format!("no {}- tag in filename", key)))
}

impl ConventionParser for SparcParser {
    fn convention(&self) -> NamingConvention {
        NamingConvention::Sparc
    }

    fn parse(&self, path: &str, modified: NaiveDate) -> Result<Parsed, MetadataParseError> {
        let parts = SourceParts::new(path)?;
        let tags = SparcTags::read(tokenizer::stem(parts.file_name));
        let mut draft = RecordDraft::new(parts.path, modified);

        draft.sample_id = Some(tag(tags.sample, Field::SampleId, "sam")?.to_string());
        draft.specimen = Some(tag(tags.specimen, Field::Specimen, "spec")?.to_string());
        draft.laterality = Some(Laterality::from_canonical(tag(
            tags.laterality,
            Field::Laterality,
            "lat",
        )?));

        let stain = tag(tags.stain, Field::Stain, "stain")?;
        match stain.split_once('+') {
            Some((first, second)) => {
                draft.stain_1 = Some(first.to_string());
                draft.stain_2 = Some(second.to_string());
                draft.channel = Some(Channel::Overlay);
            }
            None => {
                draft.stain_1 = Some(stain.to_string());
                draft.channel = Some(
                    tags.bare
                        .iter()
                        .find_map(|t| Channel::from_token(t))
                        .unwrap_or(Channel::Numbered(1)),
                );
            }
        }

        draft.section = Some(tag(tags.section, Field::Section, "sec")?.to_string());
        draft.magnification = Some(tag(tags.magnification, Field::Magnification, "mag")?.to_string());
        draft.z_stack = tags
            .z_stack
            .map(str::to_string)
            .or_else(|| tags.bare.iter().find_map(|t| detect_z_stack_token(t)));
        draft.filetype = Some(parts.filetype()?.to_string());

        Ok(Parsed {
            record: draft.finish()?,
            warnings: Vec::new(),
        })
    }
}
