use std::fmt;

/// Which side of the animal a sample was taken from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Laterality {
    Left,
    Right,
    /// Whole-nerve images (2x overviews) have no side
    Whole,
    Unknown,
    /// Token kept verbatim from an already-canonical name
    Other(String),
}

impl Laterality {
    /// Read a canonical `lat-` value. Anything outside the four canonical
    /// words is kept as-is so canonical names survive re-parsing unchanged.
    pub fn from_canonical(token: &str) -> Self {
        match token {
            "left" => Laterality::Left,
            "right" => Laterality::Right,
            "whole" => Laterality::Whole,
            "unknown" => Laterality::Unknown,
            other => Laterality::Other(other.to_string()),
        }
    }

    /// Map a lab shorthand token (ipsi/contralateral included), ignoring case
    pub fn from_legacy(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "il" | "l" | "lft" | "left" => Some(Laterality::Left),
            "r" | "cl" | "rt" | "right" => Some(Laterality::Right),
            "whole" => Some(Laterality::Whole),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Laterality::Left => "left",
            Laterality::Right => "right",
            Laterality::Whole => "whole",
            Laterality::Unknown => "unknown",
            Laterality::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acquisition channel, or a composite of all stains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// 1-based channel number from a `ch<N>` token
    Numbered(u32),
    Overlay,
}

impl Channel {
    /// Parse a whole `ch<digits>` token, ignoring case
    pub fn from_token(token: &str) -> Option<Self> {
        let lowered = token.to_ascii_lowercase();
        let digits = lowered.strip_prefix("ch")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Channel::Numbered)
    }

    pub fn is_overlay(&self) -> bool {
        matches!(self, Channel::Overlay)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Numbered(n) => write!(f, "ch{}", n),
            Channel::Overlay => f.write_str("overlay"),
        }
    }
}

/// Record fields, named the way errors and logs refer to them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    SampleId,
    Specimen,
    Laterality,
    Stain,
    Channel,
    Section,
    Magnification,
    ZStack,
    Filetype,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::SampleId => "sample_id",
            Field::Specimen => "specimen",
            Field::Laterality => "laterality",
            Field::Stain => "stain",
            Field::Channel => "channel",
            Field::Section => "section",
            Field::Magnification => "magnification",
            Field::ZStack => "z_stack",
            Field::Filetype => "filetype",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
