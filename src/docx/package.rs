//! Zip container holding the package parts.

use crate::error::CvError;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;

/// All parts of a package, in archive order.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Read a template from disk.
    pub fn open(path: &Path) -> Result<Self, CvError> {
        if !path.is_file() {
            return Err(CvError::TemplateNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path).map_err(|e| CvError::TemplateUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_bytes(&bytes).map_err(|detail| CvError::TemplateUnreadable {
            path: path.to_path_buf(),
            detail,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let cursor = Cursor::new(bytes);
        let mut archive =
            zip::ZipArchive::new(cursor).map_err(|e| format!("Failed to open ZIP: {}", e))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| format!("Failed to read ZIP entry: {}", e))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| format!("Failed to read '{}': {}", name, e))?;
            parts.push((name, data));
        }
        debug!("Package: {} parts", parts.len());
        Ok(Self { parts })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_slice())
    }

    /// A part decoded as UTF-8 XML.
    pub fn xml_part(&self, name: &str) -> Result<String, CvError> {
        let data = self.part(name).ok_or_else(|| CvError::InvalidTemplate {
            detail: format!("missing part '{}'", name),
        })?;
        String::from_utf8(data.to_vec()).map_err(|e| CvError::InvalidTemplate {
            detail: format!("part '{}' is not UTF-8: {}", name, e),
        })
    }

    /// Replace a part, or append it when new.
    pub fn set_part(&mut self, name: &str, data: impl Into<Vec<u8>>) {
        let data = data.into();
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    /// Serialise to a zip archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CvError> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (name, data) in &self.parts {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| CvError::PackageWrite(format!("{}: {}", name, e)))?;
            writer
                .write_all(data)
                .map_err(|e| CvError::PackageWrite(format!("{}: {}", name, e)))?;
        }
        let cursor = writer
            .finish()
            .map_err(|e| CvError::PackageWrite(e.to_string()))?;
        Ok(cursor.into_inner())
    }

    /// Write the package to `path` atomically (temp file in the same
    /// directory, then rename).
    pub fn save(&self, path: &Path) -> Result<(), CvError> {
        let bytes = self.to_bytes()?;
        let write_err = |source: std::io::Error| CvError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&bytes).map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Package {
        let mut pkg = Package::default();
        pkg.set_part("[Content_Types].xml", "<Types/>");
        pkg.set_part("word/document.xml", "<w:document/>");
        pkg
    }

    #[test]
    fn zip_round_trip_keeps_content() {
        let bytes = sample().to_bytes().unwrap();
        let pkg = Package::from_bytes(&bytes).unwrap();
        assert!(pkg.contains("[Content_Types].xml"));
        assert!(pkg.contains("word/document.xml"));
        assert_eq!(pkg.xml_part("word/document.xml").unwrap(), "<w:document/>");
    }

    #[test]
    fn set_part_replaces_existing() {
        let mut pkg = sample();
        pkg.set_part("word/document.xml", "<new/>");
        assert!(pkg.contains("[Content_Types].xml"));
        assert_eq!(pkg.part("word/document.xml"), Some(&b"<new/>"[..]));
    }

    #[test]
    fn missing_template_is_reported() {
        let err = Package::open(Path::new("/definitely/not/here.docx")).unwrap_err();
        assert!(matches!(err, CvError::TemplateNotFound { .. }));
    }

    #[test]
    fn non_zip_template_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        std::fs::write(&path, b"not a zip").unwrap();
        let err = Package::open(&path).unwrap_err();
        assert!(matches!(err, CvError::TemplateUnreadable { .. }));
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/cv.docx");
        sample().save(&path).unwrap();
        let pkg = Package::open(&path).unwrap();
        assert!(pkg.contains("word/document.xml"));
    }
}
