//! Path and filename tokenization shared by the classifier and every
//! convention parser.
//!
//! Segments come from splitting on `/`; sub-tokens from splitting a segment on
//! `_`, `-`, `.` and whitespace. Empty pieces (leading slash, doubled
//! delimiters) are dropped so positional lookups from the end stay stable.

/// Ordered list of tokens with signed (from-the-end) indexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Tokens<'a> {
    fn new(parts: impl Iterator<Item = &'a str>) -> Self {
        Self {
            parts: parts.filter(|p| !p.is_empty()).collect(),
        }
    }

    /// Token at `index`; negative indices count from the end (`-1` is last)
    pub fn get(&self, index: isize) -> Option<&'a str> {
        let len = self.parts.len() as isize;
        let resolved = if index < 0 { len + index } else { index };
        if resolved < 0 || resolved >= len {
            return None;
        }
        Some(self.parts[resolved as usize])
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn last(&self) -> Option<&'a str> {
        self.parts.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.parts.iter().copied()
    }
}

/// Split a raw path into its `/`-separated segments
pub fn segments(path: &str) -> Tokens<'_> {
    Tokens::new(path.split('/'))
}

/// Final path segment (the filename), if any
pub fn file_name(path: &str) -> Option<&str> {
    segments(path).last()
}

/// Split a segment on the full delimiter set: `_`, `-`, `.` and whitespace
pub fn sub_tokens(segment: &str) -> Tokens<'_> {
    Tokens::new(segment.split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace()))
}

/// Split a segment on `_` only
pub fn underscore_tokens(segment: &str) -> Tokens<'_> {
    Tokens::new(segment.split('_'))
}

/// Split a segment on runs of whitespace only
pub fn whitespace_tokens(segment: &str) -> Tokens<'_> {
    Tokens::new(segment.split_whitespace())
}

/// File extension including the leading dot (`"scan.tif"` -> `".tif"`)
///
/// Dotfiles without a further extension and names ending in a dot have none.
pub fn extension(file_name: &str) -> Option<&str> {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < file_name.len() => Some(&file_name[pos..]),
        _ => None,
    }
}

/// Filename with its extension removed
pub fn stem(file_name: &str) -> &str {
    match extension(file_name) {
        Some(ext) => &file_name[..file_name.len() - ext.len()],
        None => file_name,
    }
}

/// Whether `segment` holds `token` as a whole sub-token, ignoring case
///
/// `+`-joined stain composites are split too, so `"5ht7+ctb"` holds `"5ht7"`.
pub fn contains_token(segment: &str, token: &str) -> bool {
    sub_tokens(segment)
        .iter()
        .flat_map(|t| t.split('+'))
        .any(|t| t.eq_ignore_ascii_case(token))
}
