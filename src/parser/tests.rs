use super::*;
use crate::canonical::CanonicalPath;
use crate::error::NormalizeError;
use crate::record::{Channel, Field, Laterality};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()
}

fn parse(path: &str) -> Parsed {
    ParserRegistry::default().parse(path, date()).unwrap()
}

fn parse_err(path: &str) -> MetadataParseError {
    match ParserRegistry::default().parse(path, date()).unwrap_err() {
        NormalizeError::Parse(err) => err,
        other => panic!("expected a parse error, got {:?}", other),
    }
}

// ============================================================================
// 5-HT
// ============================================================================

#[test]
fn test_ht_positional_filename() {
    let parsed = parse("/lab/5ht+ctb/cohort/M123/slides/Acq_M123_section7_L_10x_ch1.tif");
    let record = &parsed.record;
    assert_eq!(record.sample_id(), "M123");
    assert_eq!(record.specimen(), DEFAULT_SPECIMEN);
    assert_eq!(record.laterality(), &Laterality::Left);
    assert_eq!(record.section(), "7");
    assert_eq!(record.magnification(), "10x");
    assert_eq!(record.channel(), Channel::Numbered(1));
    assert_eq!(record.stain(), "5ht");
    assert_eq!(record.filetype(), ".tif");
    assert_eq!(record.creation_date(), date());
    assert!(parsed.warnings.is_empty());
}

#[test]
fn test_ht_section_label_in_second_place() {
    let record = parse("/lab/5ht+ctb/cohort/M9/slides/Acq_section3_M9_R_20x_ch2.tif").record;
    assert_eq!(record.sample_id(), "M9");
    assert_eq!(record.laterality(), &Laterality::Right);
    assert_eq!(record.section(), "3");
    assert_eq!(record.magnification(), "20x");
    assert_eq!(record.stain(), "ctb");
}

#[test]
fn test_ht_multi_word_acquisition_label() {
    let record = parse("/lab/5ht+ctb/cohort/M1/slides/Acq 2019_M1_section7_L_10x_ch1.tif").record;
    assert_eq!(record.sample_id(), "M1");
    assert_eq!(record.laterality(), &Laterality::Left);
    assert_eq!(record.section(), "7");
    assert_eq!(record.magnification(), "10x");

    // Section label second: the sample is the last word of the label
    let record =
        parse("/lab/5ht+ctb/cohort/M9/slides/Image 2019 M9_section3_R_20x_ch2.tif").record;
    assert_eq!(record.sample_id(), "M9");
    assert_eq!(record.laterality(), &Laterality::Right);
    assert_eq!(record.section(), "3");
    assert_eq!(record.magnification(), "20x");
    assert_eq!(record.stain(), "ctb");
}

#[test]
fn test_ht_whole_mount_overview() {
    let record = parse("/lab/5ht+ctb/cohort/M5/slides/Acq_M5_section4_2x_overlay.tif").record;
    assert_eq!(record.sample_id(), "M5");
    assert_eq!(record.laterality(), &Laterality::Whole);
    assert_eq!(record.section(), "4");
    assert_eq!(record.magnification(), "2x");
    assert_eq!(record.channel(), Channel::Overlay);
    assert_eq!(record.stain_1(), "5ht");
    assert_eq!(record.stain_2(), Some("ctb"));
    assert_eq!(record.stain(), "5ht+ctb");
}

#[test]
fn test_ht_unrecognized_laterality_warns() {
    let parsed = parse("/lab/5ht+ctb/cohort/M1/slides/Acq_M1_section2_X_10x_ch1.tif");
    assert_eq!(parsed.record.laterality(), &Laterality::Unknown);
    assert_eq!(parsed.warnings.len(), 1);
    let warning = &parsed.warnings[0];
    assert_eq!(warning.field, Field::Laterality);
    assert_eq!(warning.token, "X");
    assert_eq!(warning.resolved, "unknown");
}

#[test]
fn test_ht_short_filename_names_field() {
    let err = parse_err("/lab/5ht/c/d/e/x.tif");
    assert_eq!(err.field, Field::Magnification);
}

#[test]
fn test_channel_beyond_composite_is_stain_error() {
    let err = parse_err("/lab/5ht/cohort/M1/slides/Acq_M1_section2_L_10x_ch2.tif");
    assert_eq!(err.field, Field::Stain);
}

#[test]
fn test_overlay_without_composite_warns() {
    let parsed = parse("/lab/5ht/cohort/M1/slides/Acq_M1_section2_L_10x_overlay.tif");
    assert_eq!(parsed.record.channel(), Channel::Overlay);
    assert_eq!(parsed.record.stain(), "5ht");
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].field, Field::Channel);
}

#[test]
fn test_configured_default_specimen() {
    let parser = HtParser::new(ParseOptions {
        default_specimen: "vagus".to_string(),
    });
    let parsed = parser
        .parse(
            "/lab/5ht+ctb/cohort/M123/slides/Acq_M123_section7_L_10x_ch1.tif",
            date(),
        )
        .unwrap();
    assert_eq!(parsed.record.specimen(), "vagus");
}

// ============================================================================
// Receptor subtypes
// ============================================================================

#[test]
fn test_ht2a_slide_folder() {
    let record = parse("/lab/5ht2a+ctb/cohort/M123/slide L sec 3 10x/img_ch1.tif").record;
    assert_eq!(record.sample_id(), "M123");
    assert_eq!(record.laterality(), &Laterality::Left);
    assert_eq!(record.section(), "3");
    assert_eq!(record.magnification(), "10x");
    assert_eq!(record.stain(), "5ht2a");
}

#[test]
fn test_ht2b_overlay() {
    let record = parse("/lab/5ht2b+ctb/cohort/M7/slide R sec 12 20x/img.tif").record;
    assert_eq!(record.sample_id(), "M7");
    assert_eq!(record.laterality(), &Laterality::Right);
    assert_eq!(record.section(), "12");
    assert_eq!(record.magnification(), "20x");
    assert_eq!(record.channel(), Channel::Overlay);
    assert_eq!(record.stain(), "5ht2b+ctb");
}

#[test]
fn test_ht7_trailing_words() {
    let record = parse("/lab/5ht7+ctb/cohort/M8/slide cl extra words s4 40x/img_ch2_z03.tif").record;
    assert_eq!(record.sample_id(), "M8");
    assert_eq!(record.laterality(), &Laterality::Right);
    assert_eq!(record.section(), "s4");
    assert_eq!(record.magnification(), "40x");
    assert_eq!(record.stain(), "ctb");
    assert_eq!(record.z_stack(), Some("z03"));
}

#[test]
fn test_receptor_layouts() {
    let options = ParseOptions::default();
    assert_eq!(ReceptorParser::ht2a(options.clone()).layout(), SlideLayout::Indexed);
    assert_eq!(ReceptorParser::ht2b(options.clone()).layout(), SlideLayout::Indexed);
    assert_eq!(ReceptorParser::ht7(options).layout(), SlideLayout::Trailing);
}

#[test]
fn test_receptor_short_slide_folder() {
    let err = parse_err("/lab/5ht2a+ctb/cohort/M1/slide L/img_ch1.tif");
    assert_eq!(err.field, Field::Section);
}

// ============================================================================
// A2A
// ============================================================================

#[test]
fn test_a2a_filename_and_slide_folder() {
    let record =
        parse("/lab/a2a+ctb/cohort/batch/20200101_10x_run_sec5/date_a2a_M42_L_10x_ch1.tif").record;
    assert_eq!(record.sample_id(), "M42");
    assert_eq!(record.laterality(), &Laterality::Left);
    assert_eq!(record.section(), "5");
    assert_eq!(record.magnification(), "10x");
    assert_eq!(record.stain(), "a2a");
}

#[test]
fn test_a2a_short_filename_names_sample() {
    let err = parse_err("/lab/a2a+ctb/cohort/batch/20200101_10x_run_sec5/M42_ch1.tif");
    assert_eq!(err.field, Field::SampleId);
}

#[test]
fn test_a2a_slide_folder_without_section() {
    let err = parse_err("/lab/a2a+ctb/cohort/batch/20200101_10x_run/date_a2a_M42_L_10x_ch1.tif");
    assert_eq!(err.field, Field::Section);

    // Label with no number after it
    let err =
        parse_err("/lab/a2a+ctb/cohort/batch/20200101_10x_run_sec/date_a2a_M42_L_10x_ch1.tif");
    assert_eq!(err.field, Field::Section);
}

// ============================================================================
// SPARC
// ============================================================================

#[test]
fn test_sparc_tags() {
    let parsed = parse("/data/sam-001_spec-phrenic_lat-left_stain-5ht_sec-12_mag-10x_z01.tif");
    let record = &parsed.record;
    assert_eq!(record.sample_id(), "001");
    assert_eq!(record.specimen(), "phrenic");
    assert_eq!(record.laterality(), &Laterality::Left);
    assert_eq!(record.stain(), "5ht");
    assert_eq!(record.channel(), Channel::Numbered(1));
    assert_eq!(record.section(), "12");
    assert_eq!(record.magnification(), "10x");
    assert_eq!(record.z_stack(), Some("z01"));
    assert!(parsed.warnings.is_empty());
}

#[test]
fn test_sparc_missing_tag() {
    let err = parse_err("/data/sam-001_spec-phrenic_lat-left_stain-5ht_sec-12.tif");
    assert_eq!(err.field, Field::Magnification);
}

#[test]
fn test_sparc_explicit_channel() {
    let record = parse("/d/sam-1_spec-a_lat-right_stain-ctb_sec-2_mag-20x_ch3.tif").record;
    assert_eq!(record.channel(), Channel::Numbered(3));
    assert_eq!(record.stain(), "ctb");
}

// ============================================================================
// Registry dispatch
// ============================================================================

#[test]
fn test_unknown_convention() {
    let err = ParserRegistry::default()
        .parse("/lab/misc/image.tif", date())
        .unwrap_err();
    assert!(matches!(err, NormalizeError::Unrecognized(_)));
}

#[test]
fn test_legacy_records_survive_canonical_reparse() {
    let paths = [
        "/lab/5ht+ctb/cohort/M123/slides/Acq_M123_section7_L_10x_ch1.tif",
        "/lab/5ht+ctb/cohort/M5/slides/Acq_M5_section4_2x_overlay.tif",
        "/lab/5ht+ctb/cohort/M1/slides/Acq_M1_section2_X_10x_ch1.tif",
        "/lab/5ht2b+ctb/cohort/M7/slide R sec 12 20x/img.tif",
        "/lab/a2a+ctb/cohort/batch/20200101_10x_run_sec5/date_a2a_M42_L_10x_ch1.tif",
    ];

    for path in paths {
        let original = parse(path).record;
        let canonical = CanonicalPath::build(&original);
        let reparsed = parse(canonical.as_str()).record;
        assert!(original.same_metadata(&reparsed), "Failed for {}", path);
        assert_eq!(CanonicalPath::build(&reparsed), canonical);
    }
}
