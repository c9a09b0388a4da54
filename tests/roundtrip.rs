use chrono::NaiveDate;
use proptest::prelude::*;
use sparcify::{classify, Channel, NamingConvention, Normalizer};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 11, 5).unwrap()
}

fn value(pattern: &'static str) -> impl Strategy<Value = String> {
    proptest::string::string_regex(pattern).unwrap()
}

fn laterality() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("left".to_string()),
        Just("right".to_string()),
        Just("whole".to_string()),
        Just("unknown".to_string()),
        value("[a-z]{1,6}"),
    ]
}

fn extension() -> impl Strategy<Value = String> {
    prop_oneof![Just(".tif".to_string()), Just(".png".to_string())]
}

#[derive(Debug, Clone)]
struct SparcName {
    sample: String,
    specimen: String,
    laterality: String,
    stain_1: String,
    stain_2: Option<String>,
    section: String,
    magnification: String,
    z_stack: Option<String>,
    extension: String,
}

impl SparcName {
    fn stain(&self) -> String {
        match &self.stain_2 {
            Some(second) => format!("{}+{}", self.stain_1, second),
            None => self.stain_1.clone(),
        }
    }

    fn file_name(&self) -> String {
        let mut name = format!(
            "sam-{}_spec-{}_lat-{}_stain-{}_sec-{}_mag-{}",
            self.sample,
            self.specimen,
            self.laterality,
            self.stain(),
            self.section,
            self.magnification
        );
        if let Some(z) = &self.z_stack {
            name.push_str("_z-");
            name.push_str(z);
        }
        name.push_str(&self.extension);
        name
    }
}

fn sparc_name() -> impl Strategy<Value = SparcName> {
    (
        value("[A-Za-z0-9]{1,6}"),
        value("[a-z]{1,8}"),
        laterality(),
        value("[a-z][a-z0-9]{0,4}"),
        proptest::option::of(value("[a-z][a-z0-9]{0,4}")),
        value("[0-9]{1,3}"),
        value("[0-9]{1,2}x"),
        proptest::option::of(value("z[0-9]{1,3}")),
        extension(),
    )
        .prop_map(
            |(sample, specimen, laterality, stain_1, stain_2, section, magnification, z_stack, extension)| {
                SparcName {
                    sample,
                    specimen,
                    laterality,
                    stain_1,
                    stain_2,
                    section,
                    magnification,
                    z_stack,
                    extension,
                }
            },
        )
}

/// 5-HT style source path plus the channel token used in it
fn ht_path() -> impl Strategy<Value = String> {
    (
        value("M[0-9]{1,4}"),
        value("[0-9]{1,2}"),
        prop_oneof![Just("L"), Just("R"), Just("il"), Just("cl"), Just("X")],
        prop_oneof![Just("10x"), Just("20x"), Just("40x")],
        prop_oneof![Just("ch1"), Just("ch2"), Just("overlay")],
    )
        .prop_map(|(sample, section, lat, mag, channel)| {
            format!(
                "/lab/5ht+ctb/cohort/{s}/slides/Acq_{s}_section{sec}_{lat}_{mag}_{ch}.tif",
                s = sample,
                sec = section,
                lat = lat,
                mag = mag,
                ch = channel
            )
        })
}

proptest! {
    #[test]
    fn sparc_names_recover_every_field(name in sparc_name()) {
        let path = format!("/data/{}", name.file_name());
        let image = Normalizer::default().normalize(&path, date()).unwrap();
        let record = &image.record;

        prop_assert_eq!(image.convention, NamingConvention::Sparc);
        prop_assert_eq!(record.sample_id(), name.sample.as_str());
        prop_assert_eq!(record.specimen(), name.specimen.as_str());
        prop_assert_eq!(record.laterality().as_str(), name.laterality.as_str());
        prop_assert_eq!(record.stain(), name.stain());
        prop_assert_eq!(record.section(), name.section.as_str());
        prop_assert_eq!(record.magnification(), name.magnification.as_str());
        prop_assert_eq!(record.z_stack(), name.z_stack.as_deref());
        prop_assert_eq!(record.filetype(), name.extension.as_str());
        prop_assert_eq!(record.channel().is_overlay(), name.stain_2.is_some());
        prop_assert!(image.warnings.is_empty());

        // Already canonical names come back unchanged
        prop_assert_eq!(image.canonical.file_name(), name.file_name());
    }

    #[test]
    fn canonical_paths_are_fixed_points(path in ht_path()) {
        let normalizer = Normalizer::default();
        let first = normalizer.normalize(&path, date()).unwrap();
        let second = normalizer.normalize(first.canonical.as_str(), date()).unwrap();

        prop_assert_eq!(second.convention, NamingConvention::Sparc);
        prop_assert_eq!(&second.canonical, &first.canonical);
        if matches!(first.record.channel(), Channel::Numbered(1) | Channel::Overlay) {
            prop_assert!(first.record.same_metadata(&second.record));
        }
    }

    #[test]
    fn receptor_tags_win_over_plain_serotonin(
        a in value("[a-z]{0,4}"),
        b in value("[a-z]{0,4}"),
        file in value("[a-z]{1,6}"),
    ) {
        let ht7 = format!("/lab/{}/5ht7/{}5ht2a/{}.tif", a, b, file);
        prop_assert_eq!(classify(&ht7), NamingConvention::Ht7);

        let ht2a = format!("/lab/{}/{}5ht2a/5ht/{}.tif", a, b, file);
        prop_assert_eq!(classify(&ht2a), NamingConvention::Ht2a);

        let ht2b = format!("/lab/{}/5ht2b{}/{}.tif", a, b, file);
        prop_assert_eq!(classify(&ht2b), NamingConvention::Ht2b);
    }

    #[test]
    fn normalize_is_total(path in value("(/[A-Za-z0-9_+. -]{0,10}){0,7}")) {
        let normalizer = Normalizer::default();
        let first = normalizer.normalize(&path, date());
        let second = normalizer.normalize(&path, date());
        prop_assert_eq!(first, second);
        prop_assert_eq!(classify(&path), classify(&path));
    }

    #[test]
    fn classify_never_panics(path in "\\PC{0,60}") {
        let _ = classify(&path);
        let _ = Normalizer::default().normalize(&path, date());
    }
}
