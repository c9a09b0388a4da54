use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Attaches searchable labels to an image
pub trait TagWriter {
    /// Replace the labels on `image` with `labels`, in order
    fn write_tags(&self, image: &Path, labels: &[String]) -> Result<()>;
}

/// Writes labels as a `dc:subject` bag in an XMP sidecar next to the image
/// (`img.tif` -> `img.tif.xmp`), leaving the image bytes untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmpSidecarWriter;

impl XmpSidecarWriter {
    pub fn sidecar_path(image: &Path) -> PathBuf {
        let mut name = image.as_os_str().to_owned();
        name.push(".xmp");
        PathBuf::from(name)
    }

    /// Sidecar document body for `labels`
    pub fn render(labels: &[String]) -> String {
        let mut xml = String::from(
            "<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\n \
             <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n  \
             <rdf:Description rdf:about=\"\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n   \
             <dc:subject>\n    <rdf:Bag>\n",
        );
        for label in labels {
            let _ = writeln!(xml, "     <rdf:li>{}</rdf:li>", escape(label));
        }
        xml.push_str(
            "    </rdf:Bag>\n   </dc:subject>\n  </rdf:Description>\n </rdf:RDF>\n</x:xmpmeta>\n",
        );
        xml
    }
}

impl TagWriter for XmpSidecarWriter {
    fn write_tags(&self, image: &Path, labels: &[String]) -> Result<()> {
        let sidecar = Self::sidecar_path(image);
        fs::write(&sidecar, Self::render(labels))
            .context(format!("Failed to write tags to {}", sidecar.display()))?;
        Ok(())
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
