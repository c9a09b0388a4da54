use super::{Channel, Field, Laterality, MetadataRecord};
use crate::error::MetadataParseError;
use chrono::NaiveDate;

/// Fields collected by a convention parser before validation.
///
/// `finish` is the single place a `MetadataRecord` comes into existence:
/// any missing or malformed field is reported there by name.
#[derive(Debug)]
pub(crate) struct RecordDraft {
    pub sample_id: Option<String>,
    pub specimen: Option<String>,
    pub laterality: Option<Laterality>,
    pub stain_1: Option<String>,
    pub stain_2: Option<String>,
    pub channel: Option<Channel>,
    pub section: Option<String>,
    pub magnification: Option<String>,
    pub z_stack: Option<String>,
    pub filetype: Option<String>,
    creation_date: NaiveDate,
    source_path: String,
}

impl RecordDraft {
    pub fn new(source_path: &str, creation_date: NaiveDate) -> Self {
        Self {
            sample_id: None,
            specimen: None,
            laterality: None,
            stain_1: None,
            stain_2: None,
            channel: None,
            section: None,
            magnification: None,
            z_stack: None,
            filetype: None,
            creation_date,
            source_path: source_path.to_string(),
        }
    }

    pub fn finish(self) -> Result<MetadataRecord, MetadataParseError> {
        let channel = require(Field::Channel, self.channel)?;
        if self.stain_2.is_some() && !channel.is_overlay() {
            return Err(MetadataParseError::new(
                Field::Stain,
                format!("second stain present on single channel {}", channel),
            ));
        }

        let laterality = require(Field::Laterality, self.laterality)?;
        if let Laterality::Other(raw) = &laterality {
            check_value(Field::Laterality, raw)?;
        }

        let stain_1 = value(Field::Stain, self.stain_1)?;
        if stain_1.contains('+') {
            return Err(MetadataParseError::new(
                Field::Stain,
                format!("first stain {:?} is itself a composite", stain_1),
            ));
        }
        let stain_2 = match self.stain_2 {
            Some(s) => Some(check_value(Field::Stain, &s).map(|_| s)?),
            None => None,
        };

        let z_stack = match self.z_stack {
            Some(z) => Some(check_value(Field::ZStack, &z).map(|_| z)?),
            None => None,
        };

        let filetype = value(Field::Filetype, self.filetype)?;
        if !filetype.starts_with('.') || filetype.len() < 2 {
            return Err(MetadataParseError::new(
                Field::Filetype,
                format!("{:?} is not a dotted extension", filetype),
            ));
        }

        Ok(MetadataRecord {
            sample_id: value(Field::SampleId, self.sample_id)?,
            specimen: value(Field::Specimen, self.specimen)?,
            laterality,
            stain_1,
            stain_2,
            channel,
            section: value(Field::Section, self.section)?,
            magnification: value(Field::Magnification, self.magnification)?,
            z_stack,
            filetype,
            creation_date: self.creation_date,
            source_path: self.source_path,
        })
    }
}

fn require<T>(field: Field, slot: Option<T>) -> Result<T, MetadataParseError> {
    slot.ok_or_else(|| MetadataParseError::new(field, "not found"))
}

fn value(field: Field, slot: Option<String>) -> Result<String, MetadataParseError> {
    let v = require(field, slot)?;
    check_value(field, &v)?;
    Ok(v)
}

/// Values end up as canonical path components, so they must be non-empty
/// and free of the separators the canonical form is built from.
pub(crate) fn check_value(field: Field, v: &str) -> Result<(), MetadataParseError> {
    if v.is_empty() {
        return Err(MetadataParseError::new(field, "empty value"));
    }
    if v.contains(|c: char| c == '_' || c == '/' || c == '\\' || c.is_whitespace()) {
        return Err(MetadataParseError::new(
            field,
            format!("{:?} contains a reserved separator", v),
        ));
    }
    Ok(())
}
