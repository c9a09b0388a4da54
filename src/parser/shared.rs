//! Extraction helpers common to more than one convention.

use super::ParseOptions;
use crate::error::{AmbiguousEnumerationWarning, MetadataParseError};
use crate::record::{Channel, Field, Laterality, RecordDraft};
use crate::tokenizer::{self, Tokens};
use regex::Regex;
use std::sync::OnceLock;

/// Label glued to the front of section numbers (`section7`)
pub(crate) const SECTION_LABEL: &str = "section";

/// Magnification of whole-nerve overview images
pub(crate) const WHOLE_MOUNT_MAGNIFICATION: &str = "2x";

fn z_stack_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^z\d+$").expect("z-stack pattern is valid"))
}

/// Path pieces every strategy works from
pub(crate) struct SourceParts<'a> {
    pub path: &'a str,
    pub segments: Tokens<'a>,
    pub file_name: &'a str,
}

impl<'a> SourceParts<'a> {
    pub fn new(path: &'a str) -> Result<Self, MetadataParseError> {
        let segments = tokenizer::segments(path);
        let file_name = segments
            .last()
            .ok_or_else(|| MetadataParseError::new(Field::Filetype, "path has no file name"))?;
        Ok(Self {
            path,
            segments,
            file_name,
        })
    }

    /// Path segment at signed `index`, attributed to `field` when missing
    pub fn segment(&self, index: isize, field: Field) -> Result<&'a str, MetadataParseError> {
        at(&self.segments, index, field, "path")
    }

    pub fn filetype(&self) -> Result<&'a str, MetadataParseError> {
        tokenizer::extension(self.file_name).ok_or_else(|| {
            MetadataParseError::new(
                Field::Filetype,
                format!("{:?} has no extension", self.file_name),
            )
        })
    }
}

/// Token at signed `index`, or an out-of-range error naming `field`
pub(crate) fn at<'a>(
    tokens: &Tokens<'a>,
    index: isize,
    field: Field,
    what: &str,
) -> Result<&'a str, MetadataParseError> {
    tokens
        .get(index)
        .ok_or_else(|| MetadataParseError::out_of_range(field, what, index, tokens.len()))
}

/// Drop a fixed-width label from the front of a token (`"section7"` -> `"7"`)
pub(crate) fn strip_fixed_label(
    token: &str,
    width: usize,
    field: Field,
) -> Result<&str, MetadataParseError> {
    if token.len() <= width || !token.is_char_boundary(width) {
        return Err(MetadataParseError::new(
            field,
            format!("{:?} is too short to carry a {}-character label", token, width),
        ));
    }
    Ok(&token[width..])
}

/// Whether `token` starts with `label`, ignoring case
pub(crate) fn has_label(token: &str, label: &str) -> bool {
    token.len() > label.len()
        && token.is_char_boundary(label.len())
        && token[..label.len()].eq_ignore_ascii_case(label)
}

pub(crate) fn is_whole_mount(magnification: &str) -> bool {
    magnification.eq_ignore_ascii_case(WHOLE_MOUNT_MAGNIFICATION)
}

/// First `ch<digits>` token in the filename, ignoring case
pub(crate) fn detect_channel(file_name: &str) -> Option<Channel> {
    tokenizer::sub_tokens(file_name)
        .iter()
        .find_map(Channel::from_token)
}

/// First `z<digits>` token in the filename, kept verbatim
pub(crate) fn detect_z_stack(file_name: &str) -> Option<String> {
    tokenizer::sub_tokens(file_name)
        .iter()
        .find_map(detect_z_stack_token)
}

pub(crate) fn detect_z_stack_token(token: &str) -> Option<String> {
    z_stack_pattern()
        .is_match(token)
        .then(|| token.to_string())
}

/// Stain slots resolved from a `+`-joined composite and the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StainSlots {
    pub stain_1: String,
    pub stain_2: Option<String>,
    pub channel: Channel,
}

/// A numbered channel picks its 1-based stain out of the composite; without
/// one the image is an overlay carrying up to two stains.
pub(crate) fn resolve_stains(
    composite: &str,
    channel: Option<Channel>,
    warnings: &mut Vec<AmbiguousEnumerationWarning>,
) -> Result<StainSlots, MetadataParseError> {
    if let Some(Channel::Numbered(n)) = channel {
        let stains: Vec<&str> = composite.split('+').collect();
        let stain = (n as usize)
            .checked_sub(1)
            .and_then(|i| stains.get(i))
            .ok_or_else(|| {
                MetadataParseError::new(
                    Field::Stain,
                    format!("channel ch{} has no stain in {:?}", n, composite),
                )
            })?;
        return Ok(StainSlots {
            stain_1: stain.to_string(),
            stain_2: None,
            channel: Channel::Numbered(n),
        });
    }

    let (first, second) = match composite.split_once('+') {
        Some((first, second)) => (first, Some(second.to_string())),
        None => {
            warnings.push(AmbiguousEnumerationWarning {
                field: Field::Channel,
                token: composite.to_string(),
                resolved: Channel::Overlay.to_string(),
            });
            (composite, None)
        }
    };
    Ok(StainSlots {
        stain_1: first.to_string(),
        stain_2: second,
        channel: Channel::Overlay,
    })
}

/// Map a shorthand laterality token, degrading to `unknown` with a warning
pub(crate) fn legacy_laterality(
    token: &str,
    warnings: &mut Vec<AmbiguousEnumerationWarning>,
) -> Laterality {
    Laterality::from_legacy(token).unwrap_or_else(|| {
        warnings.push(AmbiguousEnumerationWarning {
            field: Field::Laterality,
            token: token.to_string(),
            resolved: Laterality::Unknown.to_string(),
        });
        Laterality::Unknown
    })
}

/// Fill the fields every non-SPARC convention derives the same way:
/// default specimen, stains from the 5th-from-last segment, channel,
/// z-stack and filetype from the filename.
pub(crate) fn fill_legacy_common(
    draft: &mut RecordDraft,
    parts: &SourceParts<'_>,
    options: &ParseOptions,
    warnings: &mut Vec<AmbiguousEnumerationWarning>,
) -> Result<(), MetadataParseError> {
    let composite = parts.segment(-5, Field::Stain)?;
    let slots = resolve_stains(composite, detect_channel(parts.file_name), warnings)?;

    draft.specimen = Some(options.default_specimen.clone());
    draft.stain_1 = Some(slots.stain_1);
    draft.stain_2 = slots.stain_2;
    draft.channel = Some(slots.channel);
    draft.z_stack = detect_z_stack(parts.file_name);
    draft.filetype = Some(parts.filetype()?.to_string());
    Ok(())
}
