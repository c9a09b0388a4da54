use crate::tokenizer::{self, Tokens};
use serde::Serialize;
use std::fmt;

/// Legacy naming schemes a source path can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NamingConvention {
    /// Already SPARC-BIDS tagged (`sam-…_spec-…_…`)
    Sparc,
    /// Serotonin stain, filename-positional
    Ht,
    /// 5-HT2A receptor, directory-positional
    Ht2a,
    /// 5-HT2B receptor, directory-positional
    Ht2b,
    /// 5-HT7 receptor, directory-positional with trailing section/magnification
    Ht7,
    /// Adenosine A2A receptor, underscore-positional
    A2a,
    Unknown,
}

impl NamingConvention {
    pub const ALL: [NamingConvention; 7] = [
        NamingConvention::Sparc,
        NamingConvention::Ht,
        NamingConvention::Ht2a,
        NamingConvention::Ht2b,
        NamingConvention::Ht7,
        NamingConvention::A2a,
        NamingConvention::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NamingConvention::Sparc => "SPARC",
            NamingConvention::Ht => "HT",
            NamingConvention::Ht2a => "HT2A",
            NamingConvention::Ht2b => "HT2B",
            NamingConvention::Ht7 => "HT7",
            NamingConvention::A2a => "A2A",
            NamingConvention::Unknown => "UNKNOWN",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != NamingConvention::Unknown
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect which naming convention `path` follows.
///
/// Total and pure. Order matters: `"5ht"` is a substring of `"5ht7"`,
/// `"5ht2a"` and `"5ht2b"`, so the receptor tags must be checked first.
pub fn classify(path: &str) -> NamingConvention {
    let segments = tokenizer::segments(path);

    if segments.iter().any(is_sparc_segment) {
        return NamingConvention::Sparc;
    }
    if segments.iter().any(|s| tokenizer::contains_token(s, "5ht7")) {
        return NamingConvention::Ht7;
    }

    let lowered: Vec<String> = segments.iter().map(str::to_ascii_lowercase).collect();
    let any_contains = |needle: &str| lowered.iter().any(|s| s.contains(needle));

    if any_contains("5ht2a") {
        NamingConvention::Ht2a
    } else if any_contains("5ht2b") {
        NamingConvention::Ht2b
    } else if any_contains("a2a") {
        NamingConvention::A2a
    } else if any_contains("5ht") {
        NamingConvention::Ht
    } else {
        NamingConvention::Unknown
    }
}

/// Two or more `_`-joined `key-value` pairs, one of them keyed `sam`
fn is_sparc_segment(segment: &str) -> bool {
    let pairs = sparc_pairs(&tokenizer::underscore_tokens(tokenizer::stem(segment)));
    pairs.len() >= 2 && pairs.iter().any(|(key, _)| key.eq_ignore_ascii_case("sam"))
}

/// `key-value` pairs among underscore tokens, split at the first `-`.
/// Tokens without a dash, or with an empty side, are not pairs.
pub(crate) fn sparc_pairs<'a>(tokens: &Tokens<'a>) -> Vec<(&'a str, &'a str)> {
    tokens
        .iter()
        .filter_map(|token| token.split_once('-'))
        .filter(|(key, value)| {
            !key.is_empty() && !value.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparc_filename() {
        let path = "/data/sam-001_spec-phrenic_lat-left_stain-5ht_sec-12_mag-10x_z01.tif";
        assert_eq!(classify(path), NamingConvention::Sparc);
    }

    #[test]
    fn test_sparc_beats_receptor_tags() {
        let path = "/data/5ht7/sam-9_stain-5ht7.tif";
        assert_eq!(classify(path), NamingConvention::Sparc);
    }

    #[test]
    fn test_single_pair_is_not_sparc() {
        assert_eq!(classify("/data/sam-001.tif"), NamingConvention::Unknown);
        assert_eq!(
            classify("/data/spec-a_lat-left.tif"),
            NamingConvention::Unknown
        );
    }

    #[test]
    fn test_ht7_never_ht() {
        assert_eq!(classify("…/5ht7/scan_ch1.tif"), NamingConvention::Ht7);
        assert_eq!(classify("/x/5HT7+ctb/y/scan.tif"), NamingConvention::Ht7);
    }

    #[test]
    fn test_receptor_subtypes() {
        assert_eq!(classify("/x/5ht2a+ctb/a/b/c.tif"), NamingConvention::Ht2a);
        assert_eq!(classify("/x/5ht2b+ctb/a/b/c.tif"), NamingConvention::Ht2b);
        assert_eq!(classify("/x/a2a+ctb/a/b/c.tif"), NamingConvention::A2a);
        assert_eq!(classify("/x/5ht+ctb/a/b/c.tif"), NamingConvention::Ht);
    }

    #[test]
    fn test_receptor_tag_inside_longer_segment() {
        // Only 5ht7 needs a whole token; the rest match as substrings
        assert_eq!(classify("/x/run5ht2a/c.tif"), NamingConvention::Ht2a);
        assert_eq!(classify("/x/run5ht7/c.tif"), NamingConvention::Ht);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify("/x/y/z.tif"), NamingConvention::Unknown);
        assert_eq!(classify(""), NamingConvention::Unknown);
    }

    #[test]
    fn test_display_names() {
        let names: Vec<String> = NamingConvention::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            vec!["SPARC", "HT", "HT2A", "HT2B", "HT7", "A2A", "UNKNOWN"]
        );
        assert!(!NamingConvention::Unknown.is_known());
    }
}
