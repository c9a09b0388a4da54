use super::*;
use crate::batch::{NormalizedImage, Normalizer, SourceImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const NON_CANONICAL: &str = "sam-1_spec-phrenic_lat-left_stain-ctb_sec-2_mag-10x_z01.tif";
const CANONICAL_NAME: &str = "sam-1_spec-phrenic_lat-left_stain-ctb_sec-2_mag-10x_z-z01.tif";

fn image_at(path: &Path) -> NormalizedImage {
    let source = SourceImage::from_path(path).unwrap();
    Normalizer::default()
        .normalize(&source.path, source.modified)
        .unwrap()
}

fn create(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"pixels").unwrap();
    path
}

// ============================================================================
// Metadata log
// ============================================================================

#[test]
fn test_header_written_once() {
    let dir = TempDir::new().unwrap();
    let image = image_at(&create(dir.path(), NON_CANONICAL));
    let log_path = dir.path().join("metadata.csv");

    {
        let mut log = MetadataLog::open(&log_path).unwrap();
        log.append(&image).unwrap();
        log.flush().unwrap();
        assert_eq!(log.rows_written(), 1);
    }
    {
        let mut log = MetadataLog::open(&log_path).unwrap();
        log.append(&image).unwrap();
        log.flush().unwrap();
    }

    let contents = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("creation_date,filetype,sample_id,specimen,laterality"));
    assert!(lines[0].ends_with("canonical_path,source_path"));
    assert_eq!(lines.iter().filter(|l| l.starts_with("creation_date")).count(), 1);
    assert!(lines[1].contains(",.tif,1,phrenic,left,ctb,,ch1,ctb,2,10x,z01,samples/"));
}

#[test]
fn test_header_written_into_empty_file() {
    let dir = TempDir::new().unwrap();
    let image = image_at(&create(dir.path(), NON_CANONICAL));
    let log_path = dir.path().join("empty.CSV");
    fs::write(&log_path, b"").unwrap();

    let mut log = MetadataLog::open(&log_path).unwrap();
    log.append(&image).unwrap();
    log.flush().unwrap();

    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.starts_with("creation_date,"));
}

#[test]
fn test_log_rejects_non_csv() {
    let dir = TempDir::new().unwrap();
    assert!(MetadataLog::open(&dir.path().join("metadata.txt")).is_err());
    assert!(!dir.path().join("metadata.txt").exists());
}

// ============================================================================
// Tags
// ============================================================================

#[test]
fn test_sidecar_path_appends_extension() {
    assert_eq!(
        XmpSidecarWriter::sidecar_path(Path::new("/a/img.tif")),
        Path::new("/a/img.tif.xmp")
    );
}

#[test]
fn test_render_bag_in_order() {
    let labels = vec!["M1".to_string(), "a&b".to_string()];
    let xml = XmpSidecarWriter::render(&labels);
    let first = xml.find("<rdf:li>M1</rdf:li>").unwrap();
    let second = xml.find("<rdf:li>a&amp;b</rdf:li>").unwrap();
    assert!(first < second);
    assert!(xml.contains("<dc:subject>"));
}

#[test]
fn test_write_tags_creates_sidecar() {
    let dir = TempDir::new().unwrap();
    let path = create(dir.path(), NON_CANONICAL);
    let image = image_at(&path);

    XmpSidecarWriter
        .write_tags(&path, &image.record.tag_labels())
        .unwrap();

    let sidecar = fs::read_to_string(XmpSidecarWriter::sidecar_path(&path)).unwrap();
    assert!(sidecar.contains("<rdf:li>phrenic</rdf:li>"));
    assert!(sidecar.contains("<rdf:li>ch1</rdf:li>"));
    assert_eq!(fs::read(&path).unwrap(), b"pixels");
}

// ============================================================================
// Rename / relocate
// ============================================================================

#[test]
fn test_rename_in_place() {
    let dir = TempDir::new().unwrap();
    let path = create(dir.path(), NON_CANONICAL);
    let image = image_at(&path);

    let outcome = rename_in_place(&image).unwrap();
    let renamed = dir.path().join(CANONICAL_NAME);
    assert!(matches!(outcome, MoveOutcome::Moved { .. }));
    assert_eq!(outcome.path(), renamed.as_path());
    assert!(renamed.exists());
    assert!(!path.exists());

    let fresh = image_at(&renamed);
    assert!(fresh.record.same_metadata(&image.record));
    assert_eq!(fresh.canonical, image.canonical);

    let again = rename_in_place(&fresh).unwrap();
    assert_eq!(again, MoveOutcome::AlreadyCanonical(renamed));
}

#[test]
fn test_rename_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = create(dir.path(), NON_CANONICAL);
    create(dir.path(), CANONICAL_NAME);

    assert!(rename_in_place(&image_at(&path)).is_err());
    assert!(path.exists());
}

#[test]
fn test_relocate_builds_hierarchy() {
    let source_dir = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let path = create(source_dir.path(), NON_CANONICAL);
    let image = image_at(&path);

    let outcome = relocate(&image, dest.path()).unwrap();
    let expected = dest
        .path()
        .join("samples/sample-1/specimen-phrenic/laterality-left/stain-ctb/section-2/magnification-10x")
        .join(CANONICAL_NAME);
    assert_eq!(outcome.path(), expected.as_path());
    assert_eq!(fs::read(&expected).unwrap(), b"pixels");
    assert!(!path.exists());
}

// ============================================================================
// Delivery
// ============================================================================

#[test]
fn test_deliver_logs_and_tags_new_location() {
    let source_dir = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let image = image_at(&create(source_dir.path(), NON_CANONICAL));
    let mut log = MetadataLog::open(&source_dir.path().join("metadata.csv")).unwrap();

    let location = deliver(
        &image,
        &Placement::Relocate(dest.path().to_path_buf()),
        Some(&mut log),
        Some(&XmpSidecarWriter),
    )
    .unwrap();

    assert_eq!(location, image.canonical.under(dest.path()));
    assert_eq!(log.rows_written(), 1);
    assert!(XmpSidecarWriter::sidecar_path(&location).exists());
}

#[test]
fn test_failed_move_is_not_logged() {
    let dir = TempDir::new().unwrap();
    let path = create(dir.path(), NON_CANONICAL);
    create(dir.path(), CANONICAL_NAME);
    let image = image_at(&path);
    let log_path = dir.path().join("metadata.csv");
    let mut log = MetadataLog::open(&log_path).unwrap();

    let result = deliver(
        &image,
        &Placement::RenameInPlace,
        Some(&mut log),
        Some(&XmpSidecarWriter),
    );
    assert!(result.is_err());
    log.flush().unwrap();

    assert_eq!(log.rows_written(), 0);
    assert!(!fs::read_to_string(&log_path).unwrap().contains(CANONICAL_NAME));
    assert!(!XmpSidecarWriter::sidecar_path(&path).exists());
    assert!(!XmpSidecarWriter::sidecar_path(&dir.path().join(CANONICAL_NAME)).exists());
    assert!(path.exists());
}

#[test]
fn test_deliver_in_place_by_default() {
    let dir = TempDir::new().unwrap();
    let path = create(dir.path(), NON_CANONICAL);
    let image = image_at(&path);

    let location = deliver(&image, &Placement::default(), None, None).unwrap();
    assert_eq!(location, path);
    assert!(!XmpSidecarWriter::sidecar_path(&path).exists());
}
